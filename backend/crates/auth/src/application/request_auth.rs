//! Request Authentication
//!
//! Decides whether a request carries an identity. Never rejects: every
//! failure leaves the request anonymous, and authorization happens elsewhere.

use std::sync::Arc;

use crate::application::token_codec::TokenCodec;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, nickname::Nickname, token_kind::TokenKind, user_id::UserId,
    user_role::UserRole,
};

/// The identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub user_id: UserId,
    pub email: Email,
    pub nickname: Nickname,
    /// Current role from the principal record, not the token snapshot
    pub role: UserRole,
}

impl AuthenticatedPrincipal {
    pub fn authorities(&self) -> Vec<&'static str> {
        vec![self.role.authority()]
    }
}

impl From<User> for AuthenticatedPrincipal {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            nickname: user.nickname,
            role: user.role,
        }
    }
}

/// Per-request authentication state, passed explicitly down the handler
/// chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    principal: Option<AuthenticatedPrincipal>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(principal: AuthenticatedPrincipal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&AuthenticatedPrincipal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

pub struct RequestAuthenticator<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    codec: Arc<TokenCodec>,
}

impl<U> RequestAuthenticator<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, codec: Arc<TokenCodec>) -> Self {
        Self { user_repo, codec }
    }

    pub async fn authenticate(&self, access_token: Option<&str>) -> AuthContext {
        let Some(token) = access_token.filter(|t| !t.trim().is_empty()) else {
            return AuthContext::anonymous();
        };

        let claims = match self.codec.decode_expecting(token, TokenKind::Access) {
            Ok(claims) => claims,
            Err(reason) => {
                tracing::debug!(reason = %reason, "Access token not accepted");
                return AuthContext::anonymous();
            }
        };

        let email = Email::from_db(claims.sub);
        match self.user_repo.find_by_email(&email).await {
            Ok(Some(user)) => AuthContext::authenticated(user.into()),
            Ok(None) => {
                tracing::debug!(email = %email, "Access token for unknown or deleted principal");
                AuthContext::anonymous()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Principal lookup failed; continuing unauthenticated");
                AuthContext::anonymous()
            }
        }
    }
}
