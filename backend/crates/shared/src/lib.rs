//! Shared Kernel
//!
//! Vocabulary shared by every backend crate:
//! - Unified error type (`AppError`) and its HTTP classification (`ErrorKind`)
//! - Typed identifiers (`Id<T>`)
//!
//! Anything placed here must mean the same thing in every domain.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
