use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Principal role, carried in every token's `role` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Admin,
    /// Column default for rows created outside the sign-up paths
    #[default]
    Guest,
}

impl UserRole {
    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "USER",
            Admin => "ADMIN",
            Guest => "GUEST",
        }
    }

    /// Authority name attached to an authenticated request
    #[inline]
    pub const fn authority(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "ROLE_USER",
            Admin => "ROLE_ADMIN",
            Guest => "ROLE_GUEST",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code {
            "USER" => Some(User),
            "ADMIN" => Some(Admin),
            "GUEST" => Some(Guest),
            _ => None,
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("Invalid UserRole code: {}", s))
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
