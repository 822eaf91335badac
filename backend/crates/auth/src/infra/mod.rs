//! Infrastructure Layer
//!
//! Database and in-process implementations of the repository traits.

pub mod memory;
pub mod postgres;

pub use memory::MemoryAuthStore;
pub use postgres::{PgAuthRepository, PgRefreshTokenStore};
