//! Configuration Helpers
//!
//! Typed lookups over process environment variables and the compact
//! duration notation used by every TTL setting (`30s`, `15m`, `1h`, `7d`,
//! or a bare integer meaning milliseconds).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("duration is empty")]
    Empty,

    #[error("unsupported duration unit: {0}")]
    UnsupportedUnit(char),

    #[error("invalid duration format: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(String),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Parse a compact duration.
///
/// Input is trimmed and lower-cased. A trailing letter selects the unit
/// (`s`, `m`, `h`, `d`); without one the number is milliseconds.
///
/// ```
/// use std::time::Duration;
/// use platform::config::parse_duration;
///
/// assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
/// assert_eq!(parse_duration("604800000").unwrap(), Duration::from_secs(7 * 86_400));
/// ```
pub fn parse_duration(raw: &str) -> Result<Duration, DurationParseError> {
    let trimmed = raw.trim().to_lowercase();
    if trimmed.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let (number, unit) = match trimmed.chars().last() {
        Some(last) if trimmed.len() > 1 && last.is_alphabetic() => {
            (&trimmed[..trimmed.len() - last.len_utf8()], Some(last))
        }
        _ => (trimmed.as_str(), None),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| DurationParseError::InvalidFormat(raw.to_string()))?;

    let seconds_per_unit = match unit {
        None => return Ok(Duration::from_millis(value)),
        Some('s') => 1,
        Some('m') => 60,
        Some('h') => 3_600,
        Some('d') => 86_400,
        Some(other) => return Err(DurationParseError::UnsupportedUnit(other)),
    };

    value
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| DurationParseError::InvalidFormat(raw.to_string()))
}

/// Non-empty value of an environment variable
pub fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env_string(key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

pub fn env_duration(key: &str, default: &str) -> Result<Duration, ConfigError> {
    let raw = env_string(key).unwrap_or_else(|| default.to_string());
    parse_duration(&raw).map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Accepts `true`/`false`/`1`/`0`/`yes`/`no` (case-insensitive)
pub fn env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = env_string(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            reason: format!("expected a boolean, got {raw:?}"),
        }),
    }
}

pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        }),
    }
}
