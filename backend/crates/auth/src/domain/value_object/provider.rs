use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AuthError, AuthResult};

/// External identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    Google,
}

impl Provider {
    /// Stored form (`social_accounts.provider`)
    pub const fn code(&self) -> &'static str {
        match self {
            Provider::Google => "GOOGLE",
        }
    }

    /// Resolve the client registration id a login flow was started with.
    pub fn from_registration_id(registration_id: &str) -> AuthResult<Self> {
        if registration_id.eq_ignore_ascii_case("google") {
            Ok(Provider::Google)
        } else {
            Err(AuthError::UnsupportedProvider(registration_id.to_string()))
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "GOOGLE" => Some(Provider::Google),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
