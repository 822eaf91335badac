//! Entities

pub mod social_account;
pub mod token;
pub mod user;
