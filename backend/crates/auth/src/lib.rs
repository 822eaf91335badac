//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Token codec, lifecycle manager and use cases
//! - `infra/` - PostgreSQL and in-memory repository implementations
//! - `presentation/` - HTTP handlers, cookie transport, router, middleware
//!
//! ## Features
//! - Email + password registration and login
//! - Federated login (Google) with account linking by email
//! - Signed access/refresh token pair carried in two cookies
//! - One active refresh token per principal, rotated on every use
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional application pepper
//! - Presenting a rotated-out refresh token revokes the session
//! - Session store failures are reported as such, never as revocation
//! - Request authentication never rejects; it only attaches an identity

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, SigningKey};
pub use application::request_auth::{AuthContext, AuthenticatedPrincipal};
pub use error::{AuthError, AuthResult, StoreError};
pub use infra::{MemoryAuthStore, PgAuthRepository, PgRefreshTokenStore};
pub use presentation::{AuthAppState, auth_app, auth_router, complete_federated_sign_in};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
