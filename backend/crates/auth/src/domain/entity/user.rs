//! User Entity
//!
//! The slice of the principal record this subsystem reads: identifier,
//! password hash, role and the soft-delete flag.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, nickname::Nickname, user_id::UserId, user_password::UserPassword,
    user_role::UserRole,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Stable principal identifier; also the session store key
    pub email: Email,
    pub nickname: Nickname,
    /// Absent for federated-only accounts
    pub password_hash: Option<UserPassword>,
    pub role: UserRole,
    /// Soft-deleted users are invisible to repository lookups
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Account created through sign-up
    pub fn new_local(email: Email, nickname: Nickname, password_hash: UserPassword) -> Self {
        Self::build(email, nickname, Some(password_hash))
    }

    /// Account created on first federated login; has no password
    pub fn new_federated(email: Email, nickname: Nickname) -> Self {
        Self::build(email, nickname, None)
    }

    fn build(email: Email, nickname: Nickname, password_hash: Option<UserPassword>) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            nickname,
            password_hash,
            role: UserRole::User,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::RawPassword;

    #[test]
    fn test_new_users_get_user_role() {
        let email = Email::new("alice@example.com").unwrap();
        let federated = User::new_federated(email.clone(), Nickname::from_db("alice"));
        assert_eq!(federated.role, UserRole::User);
        assert!(!federated.has_password());
        assert!(!federated.is_deleted);

        let hash = UserPassword::from_raw(&RawPassword::submitted("pw123"), None).unwrap();
        let local = User::new_local(email, Nickname::from_db("alice"), hash);
        assert!(local.has_password());
        assert_ne!(local.user_id, federated.user_id);
    }

    #[test]
    fn test_soft_delete() {
        let mut user = User::new_federated(
            Email::new("bob@example.com").unwrap(),
            Nickname::from_db("bob"),
        );
        user.soft_delete();
        assert!(user.is_deleted);
    }
}
