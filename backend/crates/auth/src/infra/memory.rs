//! In-Memory Store
//!
//! Process-local implementation of every repository trait. Used when no
//! database is configured and throughout the tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::entity::{social_account::SocialAccount, user::User};
use crate::domain::repository::{RefreshTokenStore, SocialAccountRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, nickname::Nickname, provider::Provider, user_id::UserId,
};
use crate::error::{AuthError, AuthResult, StoreResult};

struct Session {
    token: String,
    expires_at: Instant,
}

impl Session {
    fn new(token: &str, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            token: token.to_string(),
            expires_at: now.checked_add(ttl).unwrap_or(now + Duration::from_secs(u32::MAX as u64)),
        }
    }

    fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Default)]
struct State {
    /// Keyed by email; holds deleted users too
    users: HashMap<String, User>,
    social_accounts: Vec<SocialAccount>,
    sessions: HashMap<String, Session>,
}

impl State {
    fn live_user(&self, email: &str) -> Option<&User> {
        self.users.get(email).filter(|u| !u.is_deleted)
    }

    /// One account per provider id, one link per provider per user
    fn link_clashes(&self, account: &SocialAccount) -> bool {
        self.social_accounts.iter().any(|a| {
            a.provider == account.provider
                && (a.provider_id == account.provider_id || a.user_id == account.user_id)
        })
    }
}

/// Shared handle; clones see the same data
#[derive(Clone, Default)]
pub struct MemoryAuthStore {
    state: Arc<RwLock<State>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user deleted. Returns false if no such user exists.
    pub async fn soft_delete(&self, email: &Email) -> bool {
        let mut state = self.state.write().await;
        match state.users.get_mut(email.as_str()) {
            Some(user) => {
                user.soft_delete();
                true
            }
            None => false,
        }
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        let state = self.state.read().await;
        state.sessions.values().filter(|s| s.is_live()).count()
    }

    /// Drop expired sessions, returning how many were removed
    pub async fn cleanup_expired(&self) -> usize {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.is_live());
        let deleted = before - state.sessions.len();

        tracing::debug!(sessions_deleted = deleted, "Cleaned up expired in-memory sessions");

        deleted
    }
}

impl UserRepository for MemoryAuthStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if state.users.contains_key(user.email.as_str()) {
            return Err(AuthError::EmailTaken);
        }
        state
            .users
            .insert(user.email.as_str().to_string(), user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.live_user(email.as_str()).cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.contains_key(email.as_str()))
    }

    async fn exists_by_nickname(&self, nickname: &Nickname) -> AuthResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .any(|u| !u.is_deleted && u.nickname == *nickname))
    }
}

impl SocialAccountRepository for MemoryAuthStore {
    async fn find_linked_user(
        &self,
        provider: Provider,
        provider_id: &str,
    ) -> AuthResult<Option<User>> {
        let state = self.state.read().await;
        let user = state
            .social_accounts
            .iter()
            .find(|a| a.provider == provider && a.provider_id == provider_id)
            .and_then(|a| state.users.values().find(|u| u.user_id == a.user_id))
            .filter(|u| !u.is_deleted)
            .cloned();
        Ok(user)
    }

    async fn exists_for_user(&self, user_id: &UserId, provider: Provider) -> AuthResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .social_accounts
            .iter()
            .any(|a| a.user_id == *user_id && a.provider == provider))
    }

    async fn create(&self, account: &SocialAccount) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if state.link_clashes(account) {
            return Err(AuthError::ProviderAlreadyLinked);
        }
        state.social_accounts.push(account.clone());
        Ok(())
    }

    async fn create_with_user(&self, user: &User, account: &SocialAccount) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if state.users.contains_key(user.email.as_str()) {
            return Err(AuthError::EmailTaken);
        }
        if state.link_clashes(account) {
            return Err(AuthError::ProviderAlreadyLinked);
        }
        state
            .users
            .insert(user.email.as_str().to_string(), user.clone());
        state.social_accounts.push(account.clone());
        Ok(())
    }
}

impl RefreshTokenStore for MemoryAuthStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let state = self.state.read().await;
        Ok(state
            .sessions
            .get(key)
            .filter(|s| s.is_live())
            .map(|s| s.token.clone()))
    }

    async fn put(&self, key: &str, token: &str, ttl: Duration) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.sessions.insert(key.to_string(), Session::new(token, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut state = self.state.write().await;
        state.sessions.remove(key);
        Ok(())
    }

    async fn replace_if_matches(
        &self,
        key: &str,
        expected: &str,
        new: &str,
        ttl: Duration,
    ) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let matches = state
            .sessions
            .get(key)
            .is_some_and(|s| s.is_live() && s.token == expected);
        if matches {
            state.sessions.insert(key.to_string(), Session::new(new, ttl));
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn user(email: &str, nickname: &str) -> User {
        User::new_federated(Email::new(email).unwrap(), Nickname::from_db(nickname))
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryAuthStore::new();
        assert_ok!(UserRepository::create(&store, &user("a@example.com", "a")).await);

        let result = UserRepository::create(&store, &user("a@example.com", "b")).await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_deleted_user_invisible_but_email_reserved() {
        let store = MemoryAuthStore::new();
        let alice = user("alice@example.com", "alice");
        UserRepository::create(&store, &alice).await.unwrap();

        assert!(store.soft_delete(&alice.email).await);

        assert!(store.find_by_email(&alice.email).await.unwrap().is_none());
        assert!(store.exists_by_email(&alice.email).await.unwrap());
        assert!(!store.exists_by_nickname(&alice.nickname).await.unwrap());
        assert_err!(UserRepository::create(&store, &alice).await);
    }

    #[tokio::test]
    async fn test_linked_user_lookup() {
        let store = MemoryAuthStore::new();
        let alice = user("alice@example.com", "alice");
        UserRepository::create(&store, &alice).await.unwrap();
        let link = SocialAccount::link(alice.user_id, Provider::Google, "g-1");
        SocialAccountRepository::create(&store, &link).await.unwrap();

        let found = store.find_linked_user(Provider::Google, "g-1").await.unwrap();
        assert_eq!(found.map(|u| u.user_id), Some(alice.user_id));
        assert!(store.find_linked_user(Provider::Google, "g-2").await.unwrap().is_none());
        assert!(store.exists_for_user(&alice.user_id, Provider::Google).await.unwrap());

        let second = SocialAccount::link(alice.user_id, Provider::Google, "g-2");
        let result = SocialAccountRepository::create(&store, &second).await;
        assert!(matches!(result, Err(AuthError::ProviderAlreadyLinked)));
    }

    #[tokio::test]
    async fn test_create_with_user_is_all_or_nothing() {
        let store = MemoryAuthStore::new();
        let alice = user("alice@example.com", "alice");
        let link = SocialAccount::link(alice.user_id, Provider::Google, "g-1");
        assert_ok!(store.create_with_user(&alice, &link).await);
        assert!(store.exists_for_user(&alice.user_id, Provider::Google).await.unwrap());

        // Provider id already taken: the new user must not be left behind
        let bob = user("bob@example.com", "bob");
        let clash = SocialAccount::link(bob.user_id, Provider::Google, "g-1");
        let result = store.create_with_user(&bob, &clash).await;
        assert!(matches!(result, Err(AuthError::ProviderAlreadyLinked)));
        assert!(!store.exists_by_email(&bob.email).await.unwrap());

        // Email already taken: the link must not be left behind
        let again = user("alice@example.com", "alice2");
        let fresh = SocialAccount::link(again.user_id, Provider::Google, "g-2");
        let result = store.create_with_user(&again, &fresh).await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));
        assert!(store.find_linked_user(Provider::Google, "g-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_put_get_delete() {
        let store = MemoryAuthStore::new();
        let ttl = Duration::from_secs(60);

        assert_eq!(store.get("k").await.unwrap(), None);
        store.put("k", "t1", ttl).await.unwrap();
        store.put("k", "t2", ttl).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("t2"));

        store.delete("k").await.unwrap();
        assert_ok!(store.delete("k").await);
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_session_expires() {
        let store = MemoryAuthStore::new();
        store.put("k", "t", Duration::ZERO).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.session_count().await, 0);
        assert_eq!(store.cleanup_expired().await, 1);
    }

    #[tokio::test]
    async fn test_replace_if_matches() {
        let store = MemoryAuthStore::new();
        let ttl = Duration::from_secs(60);
        store.put("k", "old", ttl).await.unwrap();

        assert!(!store.replace_if_matches("k", "other", "new", ttl).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("old"));

        assert!(store.replace_if_matches("k", "old", "new", ttl).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));

        assert!(!store.replace_if_matches("absent", "x", "y", ttl).await.unwrap());
        assert_eq!(store.get("absent").await.unwrap(), None);
    }
}
