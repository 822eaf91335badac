//! Nickname Value Object

use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};

pub const NICKNAME_MIN_LENGTH: usize = 2;
pub const NICKNAME_MAX_LENGTH: usize = 30;

/// Display name of a principal. Not an identifier and not unique in storage;
/// sign-up alone rejects duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub struct Nickname(String);

impl Nickname {
    /// Validate a nickname chosen at sign-up (2-30 characters after trimming)
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let trimmed = raw.as_ref().trim();
        let len = trimmed.chars().count();

        if len < NICKNAME_MIN_LENGTH || len > NICKNAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Nickname must be {}-{} characters",
                NICKNAME_MIN_LENGTH, NICKNAME_MAX_LENGTH
            )));
        }

        if trimmed.chars().any(char::is_control) {
            return Err(AppError::bad_request("Nickname contains invalid characters"));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Best-effort nickname for a federated account.
    ///
    /// Provider display names are not validated; they are trimmed, stripped of
    /// control characters and cut to the column width. Falls back to
    /// `fallback` when nothing usable is left.
    pub fn from_provider(raw: Option<&str>, fallback: &str) -> Self {
        let clean = |s: &str| -> String {
            s.trim()
                .chars()
                .filter(|c| !c.is_control())
                .take(NICKNAME_MAX_LENGTH)
                .collect()
        };

        let nickname = raw.map(clean).filter(|s| !s.is_empty());
        Self(nickname.unwrap_or_else(|| clean(fallback)))
    }

    pub fn from_db(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nickname_length_bounds() {
        assert!(Nickname::new("a").is_err());
        assert!(Nickname::new("ab").is_ok());
        assert!(Nickname::new("a".repeat(30)).is_ok());
        assert!(Nickname::new("a".repeat(31)).is_err());
        assert!(Nickname::new("   x   ").is_err());
    }

    #[test]
    fn test_nickname_trimmed() {
        assert_eq!(Nickname::new("  홍길동 ").unwrap().as_str(), "홍길동");
    }

    #[test]
    fn test_from_provider_prefers_given_name() {
        let nickname = Nickname::from_provider(Some("Alice"), "alice.w");
        assert_eq!(nickname.as_str(), "Alice");
    }

    #[test]
    fn test_from_provider_falls_back() {
        assert_eq!(Nickname::from_provider(None, "alice.w").as_str(), "alice.w");
        assert_eq!(Nickname::from_provider(Some("  "), "alice.w").as_str(), "alice.w");
    }

    #[test]
    fn test_from_provider_truncates() {
        let long = "b".repeat(50);
        assert_eq!(Nickname::from_provider(Some(&long), "x").as_str().len(), NICKNAME_MAX_LENGTH);
    }

    #[test]
    fn test_display() {
        assert_eq!(Nickname::from_db("tester").to_string(), "tester");
    }
}
