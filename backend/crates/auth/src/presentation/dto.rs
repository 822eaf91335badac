//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::request_auth::AuthenticatedPrincipal;
use crate::domain::value_object::user_role::UserRole;

// ============================================================================
// Register
// ============================================================================

/// Register request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub nickname: String,
    pub password: String,
    pub password_confirm: String,
}

/// Register response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: String,
    pub email: String,
}

// ============================================================================
// Login
// ============================================================================

/// Login request. Tokens come back as cookies only.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Current Principal
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub email: String,
    pub nickname: String,
    pub role: UserRole,
}

impl From<&AuthenticatedPrincipal> for MeResponse {
    fn from(principal: &AuthenticatedPrincipal) -> Self {
        Self {
            email: principal.email.as_str().to_string(),
            nickname: principal.nickname.as_str().to_string(),
            role: principal.role,
        }
    }
}
