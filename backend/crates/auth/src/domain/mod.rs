//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{social_account::SocialAccount, token::TokenPair, user::User};
pub use repository::{RefreshTokenStore, SocialAccountRepository, UserRepository};
