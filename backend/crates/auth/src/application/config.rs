//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;
use std::time::Duration;

use platform::config::{ConfigError, env_bool, env_duration, env_parse, env_required, env_string};
use platform::crypto::{from_base64, random_bytes};

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

pub use crate::application::token_lifecycle::RotationMode;

pub const DEFAULT_OAUTH2_SUCCESS_REDIRECT: &str = "http://localhost:3000";
pub const DEFAULT_OAUTH2_FAILURE_REDIRECT: &str = "/login?error=true";

/// Minimum HMAC key length in bytes (HS256 block-size guidance)
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// HMAC secret used to sign and verify tokens.
///
/// Built once at startup and shared read-only; there is no global key.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ConfigError> {
        if bytes.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET".to_string(),
                reason: format!(
                    "signing key must be at least {} bytes (got {})",
                    MIN_SIGNING_KEY_LEN,
                    bytes.len()
                ),
            });
        }
        Ok(Self(bytes))
    }

    /// Decode a base64 secret as found in `JWT_SECRET`
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigError> {
        let bytes = from_base64(encoded).map_err(|e| ConfigError::Invalid {
            key: "JWT_SECRET".to_string(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(bytes)
    }

    /// Fresh random key. Tokens signed with it die with the process.
    pub fn generate() -> Self {
        Self(random_bytes(64))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SigningKey").field(&"[REDACTED]").finish()
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub signing_key: SigningKey,
    /// Access token lifetime (default 30 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token lifetime, also the session store entry TTL (default 7 days)
    pub refresh_token_ttl: Duration,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
    pub cookie_same_site: SameSite,
    /// Upper bound for a single session store call
    pub store_timeout: Duration,
    pub rotation_mode: RotationMode,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Where the browser lands after a successful provider sign-in
    pub oauth2_success_redirect: String,
    pub oauth2_failure_redirect: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_key: SigningKey::generate(),
            access_token_ttl: Duration::from_secs(30 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600),
            cookie_secure: false,
            cookie_http_only: true,
            cookie_same_site: SameSite::Strict,
            store_timeout: Duration::from_secs(2),
            rotation_mode: RotationMode::default(),
            password_pepper: None,
            oauth2_success_redirect: DEFAULT_OAUTH2_SUCCESS_REDIRECT.to_string(),
            oauth2_failure_redirect: DEFAULT_OAUTH2_FAILURE_REDIRECT.to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config for development (random key, insecure cookie)
    pub fn development() -> Self {
        Self {
            signing_key: SigningKey::generate(),
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Load configuration from the environment. `JWT_SECRET` is required.
    pub fn from_env() -> Result<Self, ConfigError> {
        let signing_key = SigningKey::from_base64(&env_required("JWT_SECRET")?)?;
        Self::from_env_with_key(signing_key)
    }

    /// Load everything except the signing key from the environment
    pub fn from_env_with_key(signing_key: SigningKey) -> Result<Self, ConfigError> {
        let password_pepper = env_string("PASSWORD_PEPPER")
            .map(|raw| {
                from_base64(&raw).map_err(|e| ConfigError::Invalid {
                    key: "PASSWORD_PEPPER".to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            signing_key,
            access_token_ttl: env_duration("JWT_ACCESS_TOKEN_EXPIRATION", "30m")?,
            refresh_token_ttl: env_duration("JWT_REFRESH_TOKEN_EXPIRATION", "7d")?,
            cookie_secure: env_bool("APP_COOKIE_SECURE", false)?,
            cookie_http_only: env_bool("APP_COOKIE_HTTP_ONLY", true)?,
            cookie_same_site: env_parse("APP_COOKIE_SAME_SITE", SameSite::Strict)?,
            store_timeout: env_duration("SESSION_STORE_TIMEOUT", "2s")?,
            rotation_mode: env_parse("SESSION_ROTATION_MODE", RotationMode::default())?,
            password_pepper,
            oauth2_success_redirect: env_string("OAUTH2_SUCCESS_REDIRECT_URL")
                .unwrap_or_else(|| DEFAULT_OAUTH2_SUCCESS_REDIRECT.to_string()),
            oauth2_failure_redirect: env_string("OAUTH2_FAILURE_REDIRECT_URL")
                .unwrap_or_else(|| DEFAULT_OAUTH2_FAILURE_REDIRECT.to_string()),
        })
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}
