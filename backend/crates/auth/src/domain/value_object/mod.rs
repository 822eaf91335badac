//! Value Object Module

pub mod email;
pub mod nickname;
pub mod provider;
pub mod token_kind;
pub mod user_id;
pub mod user_password;
pub mod user_role;
