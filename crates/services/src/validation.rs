//! Input rules shared by the REST and GraphQL entry points.

use domains::{DomainError, Result};

pub const USERNAME_LEN: (usize, usize) = (3, 15);
pub const PASSWORD_MIN_LEN: usize = 6;
pub const TITLE_LEN: (usize, usize) = (5, 100);
pub const PEREX_LEN: (usize, usize) = (10, 300);
pub const POST_CONTENT_LEN: (usize, usize) = (20, 1000);
pub const COMMENT_CONTENT_LEN: (usize, usize) = (3, 500);

/// Trims `value` and checks its length in characters. Returns the trimmed text.
pub fn bounded(label: &str, value: &str, (min, max): (usize, usize)) -> Result<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(DomainError::Validation(format!(
            "{label} must be between {min} and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn username(value: &str) -> Result<String> {
    bounded("Username", value, USERNAME_LEN)
}

/// Passwords are not trimmed.
pub fn password(value: &str) -> Result<()> {
    if value.chars().count() < PASSWORD_MIN_LEN {
        return Err(DomainError::Validation(format!(
            "Password must be at least {PASSWORD_MIN_LEN} characters long"
        )));
    }
    Ok(())
}

pub fn title(value: &str) -> Result<String> {
    bounded("Title", value, TITLE_LEN)
}

pub fn perex(value: &str) -> Result<String> {
    bounded("Perex", value, PEREX_LEN)
}

pub fn post_content(value: &str) -> Result<String> {
    bounded("Content", value, POST_CONTENT_LEN)
}

pub fn comment_content(value: &str) -> Result<String> {
    bounded("Content", value, COMMENT_CONTENT_LEN)
}

/// Parses a client-supplied identifier. Anything but a base-10 integer is rejected.
pub fn parse_id(label: &str, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| DomainError::Validation(format!("Invalid {label} ID")))
}
