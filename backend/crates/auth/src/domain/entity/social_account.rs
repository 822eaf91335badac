//! Social Account Entity
//!
//! Link between a local principal and an external provider account.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    provider::Provider,
    user_id::{SocialAccountId, UserId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialAccount {
    pub social_account_id: SocialAccountId,
    pub user_id: UserId,
    pub provider: Provider,
    /// The provider's own identifier for the external account
    pub provider_id: String,
    pub created_at: DateTime<Utc>,
}

impl SocialAccount {
    pub fn link(user_id: UserId, provider: Provider, provider_id: impl Into<String>) -> Self {
        Self {
            social_account_id: SocialAccountId::new(),
            user_id,
            provider,
            provider_id: provider_id.into(),
            created_at: Utc::now(),
        }
    }
}
