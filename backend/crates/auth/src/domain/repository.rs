//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use std::time::Duration;

use crate::domain::entity::{social_account::SocialAccount, user::User};
use crate::domain::value_object::{
    email::Email, nickname::Nickname, provider::Provider, user_id::UserId,
};
use crate::error::{AuthResult, StoreResult};

/// User repository trait.
///
/// Lookups never return soft-deleted users.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user. Fails `EmailTaken` if any row, deleted or not,
    /// already holds the email.
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// True if any row holds the email, including soft-deleted ones
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn exists_by_nickname(&self, nickname: &Nickname) -> AuthResult<bool>;
}

/// Federated account link repository trait
#[trait_variant::make(SocialAccountRepository: Send)]
pub trait LocalSocialAccountRepository {
    /// The live user linked to `(provider, provider_id)`, if any
    async fn find_linked_user(
        &self,
        provider: Provider,
        provider_id: &str,
    ) -> AuthResult<Option<User>>;

    /// Whether the user already has some account linked for `provider`
    async fn exists_for_user(&self, user_id: &UserId, provider: Provider) -> AuthResult<bool>;

    async fn create(&self, account: &SocialAccount) -> AuthResult<()>;

    /// Insert a new user together with its first link, all or nothing.
    /// Fails like [`LocalUserRepository::create`] or [`Self::create`] and
    /// then leaves neither row behind.
    async fn create_with_user(&self, user: &User, account: &SocialAccount) -> AuthResult<()>;
}

/// Session store: one active refresh token per principal key.
///
/// Entries expire on their own after the TTL given at write time; an expired
/// entry reads as absent.
#[trait_variant::make(RefreshTokenStore: Send)]
pub trait LocalRefreshTokenStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite whatever is stored under `key`
    async fn put(&self, key: &str, token: &str, ttl: Duration) -> StoreResult<()>;

    /// Idempotent; deleting an absent key succeeds
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Atomically replace the entry only if it currently equals `expected`.
    /// Returns whether the swap happened.
    async fn replace_if_matches(
        &self,
        key: &str,
        expected: &str,
        new: &str,
        ttl: Duration,
    ) -> StoreResult<bool>;
}
