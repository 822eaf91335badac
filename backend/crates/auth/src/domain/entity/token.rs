//! Token Entities
//!
//! Claims carried inside a signed token and the access/refresh pair handed to
//! clients.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::value_object::{token_kind::TokenKind, user_role::UserRole};

/// Signed claims. Times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Principal identifier (email)
    pub sub: String,
    pub role: UserRole,
    #[serde(rename = "tokenType")]
    pub token_type: TokenKind,
    pub iat: i64,
    pub exp: i64,
    /// Random per token; keeps same-second mints distinct
    pub jti: String,
}

impl TokenClaims {
    /// `exp` is exclusive: a token is expired from that second on.
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        now_secs >= self.exp
    }
}

/// Access and refresh token issued together
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp: i64) -> TokenClaims {
        TokenClaims {
            sub: "alice@example.com".to_string(),
            role: UserRole::User,
            token_type: TokenKind::Access,
            iat: 100,
            exp,
            jti: "j".to_string(),
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let c = claims(200);
        assert!(!c.is_expired_at(199));
        assert!(c.is_expired_at(200));
        assert!(c.is_expired_at(201));
    }

    #[test]
    fn test_claims_wire_names() {
        let json = serde_json::to_value(claims(200)).unwrap();
        assert_eq!(json["tokenType"], "ACCESS");
        assert_eq!(json["role"], "USER");
        assert_eq!(json["sub"], "alice@example.com");
    }

    #[test]
    fn test_token_pair_debug_redacted() {
        let pair = TokenPair {
            access_token: "aaa.bbb.ccc".to_string(),
            refresh_token: "ddd.eee.fff".to_string(),
        };
        let debug = format!("{:?}", pair);
        assert!(!debug.contains("aaa.bbb.ccc"));
    }
}
