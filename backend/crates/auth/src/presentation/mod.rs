//! Presentation Layer
//!
//! HTTP handlers, DTOs, cookie transport, router, and middleware.

pub mod cookie;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use cookie::CookieTransport;
pub use handlers::{AuthAppState, complete_federated_sign_in};
pub use middleware::authenticate_request;
pub use router::{auth_app, auth_router, with_request_authentication};
