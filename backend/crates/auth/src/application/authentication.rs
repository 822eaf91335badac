//! Authentication Service
//!
//! Login, refresh and logout use cases.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::credential::CredentialVerifier;
use crate::application::token_codec::TokenCodec;
use crate::application::token_lifecycle::TokenLifecycleManager;
use crate::domain::entity::token::TokenPair;
use crate::domain::repository::{RefreshTokenStore, UserRepository};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct AuthenticationService<U, S>
where
    U: UserRepository,
    S: RefreshTokenStore,
{
    user_repo: Arc<U>,
    credentials: CredentialVerifier,
    lifecycle: TokenLifecycleManager<S, U>,
}

impl<U, S> AuthenticationService<U, S>
where
    U: UserRepository,
    S: RefreshTokenStore,
{
    pub fn new(
        user_repo: Arc<U>,
        store: Arc<S>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            credentials: CredentialVerifier::new(config.clone()),
            lifecycle: TokenLifecycleManager::new(store, user_repo.clone(), codec, config),
            user_repo,
        }
    }

    /// Verify credentials and start a new session.
    ///
    /// An unknown identity fails `LoginIdentityNotFound`, distinct from
    /// `LoginFailed`. This lets callers discover which emails are registered.
    pub async fn login(&self, input: LoginInput) -> AuthResult<TokenPair> {
        let email = Email::new(&input.email)?;

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::LoginIdentityNotFound)?;

        let password = RawPassword::submitted(&input.password);
        self.credentials.verify(&user, &password)?;

        let pair = self.lifecycle.issue(&user).await?;

        tracing::info!(email = %user.email, "User logged in");

        Ok(pair)
    }

    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        self.lifecycle.refresh(refresh_token).await
    }

    /// End the principal's session. No-op if none exists.
    pub async fn logout(&self, email: &Email) -> AuthResult<()> {
        self.lifecycle.revoke(email).await
    }
}
