//! Application Layer
//!
//! Use cases and application services.

pub mod authentication;
pub mod config;
pub mod credential;
pub mod identity_link;
pub mod request_auth;
pub mod sign_up;
pub mod token_codec;
pub mod token_lifecycle;

// Re-exports
pub use authentication::{AuthenticationService, LoginInput};
pub use config::AuthConfig;
pub use credential::CredentialVerifier;
pub use identity_link::{FederatedSignInUseCase, IdentityLinker, OAuthAttributes};
pub use request_auth::{AuthContext, AuthenticatedPrincipal, RequestAuthenticator};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use token_codec::{TokenCodec, TokenRejection};
pub use token_lifecycle::{RotationMode, TokenLifecycleManager};
