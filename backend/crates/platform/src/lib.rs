//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations with no domain vocabulary:
//! - Configuration helpers (compact durations, typed env lookups)
//! - Cookie building and extraction
//! - Cryptographic utilities (random bytes, Base64, constant-time compare)
//! - Password hashing (Argon2id)

pub mod config;
pub mod cookie;
pub mod crypto;
pub mod password;
