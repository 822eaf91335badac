//! Auth Error Types
//!
//! Auth-specific variants that integrate with the unified
//! `kernel::error::AppError` system. Response bodies only ever carry the
//! symbolic code and a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Session store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Session store failures (infrastructure class).
///
/// Never folded into token-validity or reuse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Session store operation timed out")]
    Timeout,

    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No principal with the submitted identifier
    #[error("Login identity not found")]
    LoginIdentityNotFound,

    /// Wrong password, or no password set on the account
    #[error("Login failed")]
    LoginFailed,

    /// Malformed, expired, or wrong-kind refresh token
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Presented refresh token is not the one on record
    #[error("Refresh token does not match the active session")]
    StoreMismatch,

    #[error("Refresh token is missing")]
    MissingRefreshToken,

    /// No principal is attached to the request
    #[error("Access denied")]
    AccessDenied,

    #[error("Provider response has no unique id ({0})")]
    MissingProviderId(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// The principal already has a different account linked for this provider
    #[error("A different account is already linked for this provider")]
    ProviderAlreadyLinked,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Nickname already exists")]
    NicknameTaken,

    #[error("Password confirmation does not match")]
    PasswordMismatch,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::LoginIdentityNotFound => StatusCode::NOT_FOUND,
            AuthError::LoginFailed
            | AuthError::InvalidRefreshToken
            | AuthError::StoreMismatch
            | AuthError::MissingProviderId(_) => StatusCode::UNAUTHORIZED,
            AuthError::AccessDenied => StatusCode::FORBIDDEN,
            AuthError::EmailTaken | AuthError::NicknameTaken | AuthError::ProviderAlreadyLinked => {
                StatusCode::CONFLICT
            }
            AuthError::MissingRefreshToken
            | AuthError::UnsupportedProvider(_)
            | AuthError::PasswordMismatch
            | AuthError::InvalidInput(_)
            | AuthError::PasswordValidation(_) => StatusCode::BAD_REQUEST,
            AuthError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::LoginIdentityNotFound => ErrorKind::NotFound,
            AuthError::LoginFailed
            | AuthError::InvalidRefreshToken
            | AuthError::StoreMismatch
            | AuthError::MissingProviderId(_) => ErrorKind::Unauthorized,
            AuthError::AccessDenied => ErrorKind::Forbidden,
            AuthError::EmailTaken | AuthError::NicknameTaken | AuthError::ProviderAlreadyLinked => {
                ErrorKind::Conflict
            }
            AuthError::MissingRefreshToken
            | AuthError::UnsupportedProvider(_)
            | AuthError::PasswordMismatch
            | AuthError::InvalidInput(_)
            | AuthError::PasswordValidation(_) => ErrorKind::BadRequest,
            AuthError::Store(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Symbolic error code exposed to callers
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::LoginIdentityNotFound => "LOGIN_IDENTITY_NOT_FOUND",
            AuthError::LoginFailed => "LOGIN_FAILED",
            AuthError::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            AuthError::StoreMismatch => "STORE_MISMATCH",
            AuthError::MissingRefreshToken => "MISSING_REFRESH_TOKEN",
            AuthError::AccessDenied => "ACCESS_DENIED",
            AuthError::MissingProviderId(_) => "MISSING_PROVIDER_ID",
            AuthError::UnsupportedProvider(_) => "UNSUPPORTED_PROVIDER",
            AuthError::ProviderAlreadyLinked => "PROVIDER_ALREADY_LINKED",
            AuthError::EmailTaken => "EMAIL_TAKEN",
            AuthError::NicknameTaken => "NICKNAME_TAKEN",
            AuthError::PasswordMismatch => "PASSWORD_MISMATCH",
            AuthError::InvalidInput(_) => "INVALID_INPUT",
            AuthError::PasswordValidation(_) => "INVALID_PASSWORD",
            AuthError::Store(StoreError::Timeout) => "SESSION_STORE_TIMEOUT",
            AuthError::Store(StoreError::Unavailable(_)) => "SESSION_STORE_UNAVAILABLE",
            AuthError::Database(_) => "DATABASE_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Caller-facing message. Infrastructure details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AuthError::InvalidInput(_) | AuthError::PasswordValidation(_) => self.to_string(),
            AuthError::Store(_) => "Session store is temporarily unavailable".to_string(),
            AuthError::Database(_) | AuthError::Internal(_) => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.public_message()).with_code(self.code());

        match self {
            AuthError::StoreMismatch => err.with_action("Sign in again"),
            AuthError::Store(_) => err.with_action("Retry the request later"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Store(e) => {
                tracing::error!(error = %e, "Session store error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::LoginFailed | AuthError::LoginIdentityNotFound => {
                tracing::warn!(code = self.code(), "Rejected login attempt");
            }
            AuthError::StoreMismatch => {
                tracing::warn!("Refresh rejected: token does not match active session");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        if err.kind() == ErrorKind::BadRequest {
            AuthError::InvalidInput(err.message().to_string())
        } else {
            AuthError::Internal(err.to_string())
        }
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::PasswordValidation(err.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::LoginIdentityNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AuthError::LoginFailed.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidRefreshToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::StoreMismatch.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MissingRefreshToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::Store(StoreError::Timeout).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_kind_matches_status() {
        let errors = [
            AuthError::LoginIdentityNotFound,
            AuthError::LoginFailed,
            AuthError::StoreMismatch,
            AuthError::ProviderAlreadyLinked,
            AuthError::PasswordMismatch,
            AuthError::AccessDenied,
            AuthError::Store(StoreError::Unavailable("down".into())),
            AuthError::Internal("boom".into()),
        ];
        for err in errors {
            assert_eq!(err.kind().status_code(), err.status_code().as_u16());
        }
    }

    #[test]
    fn test_app_error_carries_code() {
        let app = AuthError::StoreMismatch.to_app_error();
        assert_eq!(app.code(), Some("STORE_MISMATCH"));
        assert_eq!(app.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_store_details_not_exposed() {
        let app = AuthError::Store(StoreError::Unavailable("10.0.0.7:6379 refused".into()))
            .to_app_error();
        assert!(!app.message().contains("10.0.0.7"));
        assert_eq!(app.code(), Some("SESSION_STORE_UNAVAILABLE"));
    }

    #[test]
    fn test_bad_request_app_error_maps_to_invalid_input() {
        let err: AuthError = AppError::bad_request("Invalid email format").into();
        assert!(matches!(err, AuthError::InvalidInput(msg) if msg == "Invalid email format"));
    }
}
