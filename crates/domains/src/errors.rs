//! # DomainError
//!
//! Centralized error handling for the Rusty-Blog ecosystem.
//! Adapters translate their own failures into these variants; transports
//! translate these variants into status codes.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Resource not found (e.g., Post, User)
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("comment not found with ID {0}")]
    CommentNotFound(i64),

    /// Validation failure (e.g., title too short)
    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid vote type {0:?}, must be \"upvote\" or \"downvote\"")]
    InvalidDirection(String),

    /// Missing or bad credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not the owner of the resource
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource already exists (e.g., duplicate username)
    #[error("conflict: {0}")]
    Conflict(String),

    /// The voter already holds this exact stance on the comment.
    #[error("you have already voted this way")]
    AlreadyVoted,

    /// A concurrent request inserted the same (voter, comment) ledger row.
    #[error("a concurrent vote from this voter was recorded first, retry the request")]
    DuplicateVote,

    /// Infrastructure failure (e.g., DB down)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        DomainError::NotFound { entity, id }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        DomainError::Internal(err.to_string())
    }
}

/// A specialized Result type for Rusty-Blog logic.
pub type Result<T> = std::result::Result<T, DomainError>;
