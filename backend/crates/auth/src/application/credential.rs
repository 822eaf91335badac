//! Credential Verification

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::value_object::user_password::RawPassword;
use crate::error::{AuthError, AuthResult};

/// Checks a submitted password against a principal's stored hash.
///
/// "Wrong password" and "no password set" are the same `LoginFailed`.
pub struct CredentialVerifier {
    config: Arc<AuthConfig>,
}

impl CredentialVerifier {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    pub fn verify(&self, user: &User, password: &RawPassword) -> AuthResult<()> {
        let Some(hash) = &user.password_hash else {
            tracing::debug!(email = %user.email, "Password login on an account without password");
            return Err(AuthError::LoginFailed);
        };

        if hash.verify(password, self.config.pepper()) {
            Ok(())
        } else {
            Err(AuthError::LoginFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        email::Email, nickname::Nickname, user_password::UserPassword,
    };

    fn user_with_password(password: &str, config: &AuthConfig) -> User {
        let hash = UserPassword::from_raw(&RawPassword::submitted(password), config.pepper()).unwrap();
        User::new_local(
            Email::new("alice@example.com").unwrap(),
            Nickname::from_db("alice"),
            hash,
        )
    }

    #[test]
    fn test_matching_password() {
        let config = Arc::new(AuthConfig::default());
        let user = user_with_password("pw123", &config);
        let verifier = CredentialVerifier::new(config);

        assert!(verifier.verify(&user, &RawPassword::submitted("pw123")).is_ok());
    }

    #[test]
    fn test_wrong_password() {
        let config = Arc::new(AuthConfig::default());
        let user = user_with_password("pw123", &config);
        let verifier = CredentialVerifier::new(config);

        assert!(matches!(
            verifier.verify(&user, &RawPassword::submitted("pw124")),
            Err(AuthError::LoginFailed)
        ));
    }

    #[test]
    fn test_no_password_set() {
        let verifier = CredentialVerifier::new(Arc::new(AuthConfig::default()));
        let user = User::new_federated(
            Email::new("bob@example.com").unwrap(),
            Nickname::from_db("bob"),
        );

        assert!(matches!(
            verifier.verify(&user, &RawPassword::submitted("")),
            Err(AuthError::LoginFailed)
        ));
    }

    #[test]
    fn test_pepper_must_match() {
        let peppered = AuthConfig {
            password_pepper: Some(b"pepper".to_vec()),
            ..AuthConfig::default()
        };
        let user = user_with_password("pw123", &peppered);
        let verifier = CredentialVerifier::new(Arc::new(AuthConfig::default()));

        assert!(verifier.verify(&user, &RawPassword::submitted("pw123")).is_err());
    }
}
