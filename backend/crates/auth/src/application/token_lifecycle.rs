//! Token Lifecycle
//!
//! Issuance, rotation and revocation of the single active refresh token per
//! principal.
//!
//! Per principal the session store entry moves through
//! `ISSUED -> ROTATED | REVOKED -> ABSENT`. A refresh token is only honoured
//! while it is byte-for-byte the stored one; presenting anything else for a
//! principal (an already-rotated token, a token after logout) revokes the
//! session and fails `StoreMismatch`.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use platform::crypto::constant_time_eq;

use crate::application::config::AuthConfig;
use crate::application::token_codec::TokenCodec;
use crate::domain::entity::{token::TokenPair, user::User};
use crate::domain::repository::{RefreshTokenStore, UserRepository};
use crate::domain::value_object::{email::Email, token_kind::TokenKind};
use crate::error::{AuthError, AuthResult, StoreError, StoreResult};

/// How a successful refresh writes the rotated token back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationMode {
    /// Read, compare, then overwrite. Two concurrent refreshes with the same
    /// token can both succeed; the last write wins.
    #[default]
    ReadThenWrite,
    /// Overwrite only if the entry still holds the presented token. The loser
    /// of a concurrent refresh gets `StoreMismatch` and the winner's entry is
    /// left in place.
    CompareAndSwap,
}

impl fmt::Display for RotationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationMode::ReadThenWrite => f.write_str("read-then-write"),
            RotationMode::CompareAndSwap => f.write_str("compare-and-swap"),
        }
    }
}

impl FromStr for RotationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "read-then-write" => Ok(RotationMode::ReadThenWrite),
            "compare-and-swap" | "cas" => Ok(RotationMode::CompareAndSwap),
            other => Err(format!("unknown rotation mode: {}", other)),
        }
    }
}

pub struct TokenLifecycleManager<S, U>
where
    S: RefreshTokenStore,
    U: UserRepository,
{
    store: Arc<S>,
    user_repo: Arc<U>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<S, U> TokenLifecycleManager<S, U>
where
    S: RefreshTokenStore,
    U: UserRepository,
{
    pub fn new(
        store: Arc<S>,
        user_repo: Arc<U>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            store,
            user_repo,
            codec,
            config,
        }
    }

    /// Mint a fresh pair and make its refresh token the principal's only
    /// valid one, replacing any earlier session.
    pub async fn issue(&self, user: &User) -> AuthResult<TokenPair> {
        let pair = self.mint_pair(user)?;

        self.bounded(self.store.put(
            user.email.as_str(),
            &pair.refresh_token,
            self.config.refresh_token_ttl,
        ))
        .await?;

        tracing::info!(email = %user.email, role = %user.role, "Issued token pair");

        Ok(pair)
    }

    /// Exchange the presented refresh token for a new pair.
    pub async fn refresh(&self, presented: &str) -> AuthResult<TokenPair> {
        let claims = self
            .codec
            .decode_expecting(presented, TokenKind::Refresh)
            .map_err(|reason| {
                tracing::warn!(reason = %reason, "Refresh token rejected");
                AuthError::InvalidRefreshToken
            })?;

        let key = claims.sub;
        let stored = self.bounded(self.store.get(&key)).await?;

        let is_current = stored
            .as_deref()
            .is_some_and(|s| constant_time_eq(s.as_bytes(), presented.as_bytes()));

        if !is_current {
            tracing::warn!(
                email = %key,
                session_present = stored.is_some(),
                "Refresh token is not the active one; revoking session"
            );
            self.bounded(self.store.delete(&key)).await?;
            return Err(AuthError::StoreMismatch);
        }

        let email = Email::from_db(key.as_str());
        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            tracing::warn!(email = %email, "Refresh for a principal that no longer exists");
            self.bounded(self.store.delete(&key)).await?;
            return Err(AuthError::InvalidRefreshToken);
        };

        let pair = self.mint_pair(&user)?;
        let ttl = self.config.refresh_token_ttl;

        match self.config.rotation_mode {
            RotationMode::ReadThenWrite => {
                self.bounded(self.store.put(&key, &pair.refresh_token, ttl))
                    .await?;
            }
            RotationMode::CompareAndSwap => {
                let swapped = self
                    .bounded(self.store.replace_if_matches(
                        &key,
                        presented,
                        &pair.refresh_token,
                        ttl,
                    ))
                    .await?;

                if !swapped {
                    tracing::warn!(email = %email, "Lost refresh rotation race");
                    return Err(AuthError::StoreMismatch);
                }
            }
        }

        tracing::info!(email = %email, "Rotated refresh token");

        Ok(pair)
    }

    /// Drop the principal's session. Idempotent.
    pub async fn revoke(&self, email: &Email) -> AuthResult<()> {
        self.bounded(self.store.delete(email.as_str())).await?;
        tracing::info!(email = %email, "Revoked refresh session");
        Ok(())
    }

    fn mint_pair(&self, user: &User) -> AuthResult<TokenPair> {
        let subject = user.email.as_str();

        Ok(TokenPair {
            access_token: self.codec.mint(
                subject,
                user.role,
                TokenKind::Access,
                self.config.access_token_ttl,
            )?,
            refresh_token: self.codec.mint(
                subject,
                user.role,
                TokenKind::Refresh,
                self.config.refresh_token_ttl,
            )?,
        })
    }

    /// A timed-out store call is a store failure, never an absent entry.
    async fn bounded<T>(&self, op: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        tokio::time::timeout(self.config.store_timeout, op)
            .await
            .unwrap_or(Err(StoreError::Timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_mode_from_str() {
        assert_eq!("read-then-write".parse::<RotationMode>(), Ok(RotationMode::ReadThenWrite));
        assert_eq!("READ_THEN_WRITE".parse::<RotationMode>(), Ok(RotationMode::ReadThenWrite));
        assert_eq!("compare-and-swap".parse::<RotationMode>(), Ok(RotationMode::CompareAndSwap));
        assert_eq!("cas".parse::<RotationMode>(), Ok(RotationMode::CompareAndSwap));
        assert!("optimistic".parse::<RotationMode>().is_err());
    }

    #[test]
    fn test_rotation_mode_display_roundtrip() {
        for mode in [RotationMode::ReadThenWrite, RotationMode::CompareAndSwap] {
            assert_eq!(mode.to_string().parse::<RotationMode>(), Ok(mode));
        }
    }
}
