//! # auth-adapters
//!
//! Credential handling for Rusty-Blog: Argon2 password hashing and, with the
//! `auth-jwt` feature, HS256 bearer tokens.

pub mod password;
#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2Hasher;
#[cfg(feature = "auth-jwt")]
pub use jwt::JwtIssuer;
