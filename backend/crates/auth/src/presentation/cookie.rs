//! Cookie Transport
//!
//! Carries the token pair as two cookies. Both share the same attributes;
//! only the name and Max-Age differ.

use axum::http::header::InvalidHeaderValue;
use axum::http::{HeaderMap, HeaderValue};

use platform::cookie::{CookieConfig, extract_cookie, set_cookie_header};

use crate::application::config::AuthConfig;
use crate::domain::entity::token::TokenPair;
use crate::error::{AuthError, AuthResult};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

#[derive(Debug, Clone)]
pub struct CookieTransport {
    access: CookieConfig,
    refresh: CookieConfig,
}

impl CookieTransport {
    pub fn new(config: &AuthConfig) -> Self {
        let cookie = |name: &str, ttl| CookieConfig {
            name: name.to_string(),
            secure: config.cookie_secure,
            http_only: config.cookie_http_only,
            same_site: config.cookie_same_site,
            path: "/".to_string(),
            max_age: Some(ttl),
        };

        Self {
            access: cookie(ACCESS_TOKEN_COOKIE, config.access_token_ttl),
            refresh: cookie(REFRESH_TOKEN_COOKIE, config.refresh_token_ttl),
        }
    }

    /// `Set-Cookie` values for a freshly issued pair, access first
    pub fn encode(&self, pair: &TokenPair) -> AuthResult<[HeaderValue; 2]> {
        Ok([
            set_cookie_header(&self.access, &pair.access_token).map_err(invalid_header)?,
            set_cookie_header(&self.refresh, &pair.refresh_token).map_err(invalid_header)?,
        ])
    }

    /// `Set-Cookie` values that expire both cookies
    pub fn expire(&self) -> AuthResult<[HeaderValue; 2]> {
        Ok([
            expired(&self.access)?,
            expired(&self.refresh)?,
        ])
    }

    pub fn access_token(&self, headers: &HeaderMap) -> Option<String> {
        non_blank(extract_cookie(headers, &self.access.name))
    }

    pub fn refresh_token(&self, headers: &HeaderMap) -> Option<String> {
        non_blank(extract_cookie(headers, &self.refresh.name))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn expired(cookie: &CookieConfig) -> AuthResult<HeaderValue> {
    HeaderValue::from_str(&cookie.build_expired_cookie()).map_err(invalid_header)
}

fn invalid_header(err: InvalidHeaderValue) -> AuthError {
    AuthError::Internal(format!("Invalid cookie header: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use platform::cookie::SameSite;
    use std::time::Duration;

    fn transport() -> CookieTransport {
        CookieTransport::new(&AuthConfig {
            access_token_ttl: Duration::from_secs(1_800),
            refresh_token_ttl: Duration::from_secs(604_800),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            ..AuthConfig::default()
        })
    }

    #[test]
    fn test_encode_uses_each_token_ttl() {
        let pair = TokenPair {
            access_token: "aaa".to_string(),
            refresh_token: "rrr".to_string(),
        };
        let [access, refresh] = transport().encode(&pair).unwrap();

        assert_eq!(
            access.to_str().unwrap(),
            "access_token=aaa; Path=/; Max-Age=1800; HttpOnly; Secure; SameSite=Lax"
        );
        assert_eq!(
            refresh.to_str().unwrap(),
            "refresh_token=rrr; Path=/; Max-Age=604800; HttpOnly; Secure; SameSite=Lax"
        );
    }

    #[test]
    fn test_expire_zeroes_max_age() {
        let [access, refresh] = transport().expire().unwrap();

        assert!(access.to_str().unwrap().starts_with("access_token=; Path=/; Max-Age=0"));
        assert!(refresh.to_str().unwrap().starts_with("refresh_token=; Path=/; Max-Age=0"));
        assert!(refresh.to_str().unwrap().ends_with("SameSite=Lax"));
    }

    #[test]
    fn test_decode() {
        let transport = transport();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc; refresh_token="),
        );

        assert_eq!(transport.access_token(&headers).as_deref(), Some("abc"));
        assert_eq!(transport.refresh_token(&headers), None);
        assert_eq!(transport.access_token(&HeaderMap::new()), None);
    }
}
