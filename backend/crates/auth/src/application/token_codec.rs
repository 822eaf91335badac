//! Token Codec
//!
//! Mints and verifies compact HS256-signed tokens. Pure computation: no I/O,
//! no session store access.
//!
//! Expiry is checked here rather than by `jsonwebtoken`, whose built-in check
//! applies leeway and treats `exp` as inclusive. A token is expired from the
//! second named by `exp` onwards, so a zero-TTL token is born expired.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::application::config::SigningKey;
use crate::domain::entity::token::TokenClaims;
use crate::domain::value_object::{token_kind::TokenKind, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Why a presented token was not accepted.
///
/// Internal detail for logs; callers only ever see a generic rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("expected a {expected} token, got {found}")]
    WrongKind { expected: TokenKind, found: TokenKind },
}

impl From<jsonwebtoken::errors::Error> for TokenRejection {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenRejection::BadSignature,
            _ => TokenRejection::Malformed,
        }
    }
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    /// Mint a token for `subject`, issued now and valid for `ttl`.
    pub fn mint(
        &self,
        subject: &str,
        role: UserRole,
        kind: TokenKind,
        ttl: Duration,
    ) -> AuthResult<String> {
        self.mint_with(
            subject,
            role,
            kind,
            ttl,
            Utc::now().timestamp(),
            &Uuid::new_v4().to_string(),
        )
    }

    /// Deterministic form of [`Self::mint`]: identical inputs give an
    /// identical token.
    pub fn mint_with(
        &self,
        subject: &str,
        role: UserRole,
        kind: TokenKind,
        ttl: Duration,
        issued_at: i64,
        token_id: &str,
    ) -> AuthResult<String> {
        // `exp` has whole-second resolution; round up so a sub-second TTL
        // still yields a usable token
        let whole_secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
        let ttl_secs = i64::try_from(whole_secs).unwrap_or(i64::MAX);
        let claims = TokenClaims {
            sub: subject.to_string(),
            role,
            token_type: kind,
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
            jti: token_id.to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Structure, signature and expiry check. Never errors; any problem
    /// yields `false`.
    pub fn verify_signature_and_expiry(&self, token: &str) -> bool {
        self.decode_verified(token).is_ok()
    }

    /// Claims of a token whose signature checks out, expired or not.
    ///
    /// Callers that need a live token use [`Self::decode_verified`] or
    /// [`Self::decode_expecting`] instead.
    pub fn read_claims(&self, token: &str) -> Result<TokenClaims, TokenRejection> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Signature and expiry checked against the current time
    pub fn decode_verified(&self, token: &str) -> Result<TokenClaims, TokenRejection> {
        self.decode_verified_at(token, Utc::now().timestamp())
    }

    pub fn decode_verified_at(
        &self,
        token: &str,
        now_secs: i64,
    ) -> Result<TokenClaims, TokenRejection> {
        let claims = self.read_claims(token)?;
        if claims.is_expired_at(now_secs) {
            return Err(TokenRejection::Expired);
        }
        Ok(claims)
    }

    /// Signature, expiry and kind. Every call site that consumes a token
    /// goes through here with the kind it requires.
    pub fn decode_expecting(
        &self,
        token: &str,
        expected: TokenKind,
    ) -> Result<TokenClaims, TokenRejection> {
        let claims = self.decode_verified(token)?;
        if claims.token_type != expected {
            return Err(TokenRejection::WrongKind {
                expected,
                found: claims.token_type,
            });
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(byte: u8) -> TokenCodec {
        TokenCodec::new(&SigningKey::from_bytes(vec![byte; 32]).unwrap())
    }

    const HOUR: Duration = Duration::from_secs(3_600);

    #[test]
    fn test_mint_and_verify() {
        let codec = codec(1);
        let token = codec
            .mint("alice@example.com", UserRole::User, TokenKind::Access, HOUR)
            .unwrap();

        assert!(codec.verify_signature_and_expiry(&token));
        let claims = codec.decode_verified(&token).unwrap();
        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.role, UserRole::User);
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 3_600);
    }

    #[test]
    fn test_mint_with_is_deterministic() {
        let codec = codec(1);
        let a = codec
            .mint_with("a@example.com", UserRole::Admin, TokenKind::Refresh, HOUR, 1_700_000_000, "id-1")
            .unwrap();
        let b = codec
            .mint_with("a@example.com", UserRole::Admin, TokenKind::Refresh, HOUR, 1_700_000_000, "id-1")
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_same_second_mints_differ() {
        let codec = codec(1);
        let a = codec.mint("a@example.com", UserRole::User, TokenKind::Refresh, HOUR).unwrap();
        let b = codec.mint("a@example.com", UserRole::User, TokenKind::Refresh, HOUR).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let codec = codec(1);
        let token = codec
            .mint("a@example.com", UserRole::User, TokenKind::Access, Duration::ZERO)
            .unwrap();

        assert!(!codec.verify_signature_and_expiry(&token));
        assert_eq!(codec.decode_verified(&token), Err(TokenRejection::Expired));
        // Signature still checks out
        assert!(codec.read_claims(&token).is_ok());
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = codec(1);
        let token = codec
            .mint_with("a@example.com", UserRole::User, TokenKind::Access, Duration::from_secs(10), 1_000, "j")
            .unwrap();

        assert!(codec.decode_verified_at(&token, 1_009).is_ok());
        assert_eq!(codec.decode_verified_at(&token, 1_010), Err(TokenRejection::Expired));
    }

    #[test]
    fn test_sub_second_ttl_rounds_up() {
        let codec = codec(1);
        let token = codec
            .mint_with("a@example.com", UserRole::User, TokenKind::Access, Duration::from_millis(999), 1_000, "j")
            .unwrap();

        assert_eq!(codec.read_claims(&token).unwrap().exp, 1_001);
        assert!(codec.decode_verified_at(&token, 1_000).is_ok());
        assert_eq!(codec.decode_verified_at(&token, 1_001), Err(TokenRejection::Expired));

        let token = codec
            .mint_with("a@example.com", UserRole::User, TokenKind::Access, Duration::from_millis(1_500), 1_000, "j")
            .unwrap();
        assert_eq!(codec.read_claims(&token).unwrap().exp, 1_002);
    }

    #[test]
    fn test_foreign_key_rejected() {
        let token = codec(1)
            .mint("a@example.com", UserRole::User, TokenKind::Access, HOUR)
            .unwrap();

        let other = codec(2);
        assert!(!other.verify_signature_and_expiry(&token));
        assert_eq!(other.read_claims(&token), Err(TokenRejection::BadSignature));
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = codec(1);
        for token in ["", "abc", "a.b.c", "not.a.token.at.all"] {
            assert!(!codec.verify_signature_and_expiry(token));
        }
        assert_eq!(codec.decode_verified("abc"), Err(TokenRejection::Malformed));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec(1);
        let token = codec
            .mint("a@example.com", UserRole::User, TokenKind::Access, HOUR)
            .unwrap();
        let admin = codec
            .mint("a@example.com", UserRole::Admin, TokenKind::Access, HOUR)
            .unwrap();

        // Splice the admin payload onto the user signature
        let parts: Vec<&str> = token.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], admin_parts[1], parts[2]);

        assert!(!codec.verify_signature_and_expiry(&forged));
    }

    #[test]
    fn test_kind_is_checked() {
        let codec = codec(1);
        let access = codec
            .mint("a@example.com", UserRole::User, TokenKind::Access, HOUR)
            .unwrap();

        assert!(codec.decode_expecting(&access, TokenKind::Access).is_ok());
        assert_eq!(
            codec.decode_expecting(&access, TokenKind::Refresh),
            Err(TokenRejection::WrongKind {
                expected: TokenKind::Refresh,
                found: TokenKind::Access,
            })
        );
    }
}
