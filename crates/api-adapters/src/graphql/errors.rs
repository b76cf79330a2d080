//! `DomainError` to GraphQL error translation. The code goes into the
//! `extensions.code` field of each error.

use async_graphql::{Error, ErrorExtensions};
use domains::DomainError;
use tracing::error;

pub fn code(err: &DomainError) -> &'static str {
    match err {
        DomainError::Validation(_) | DomainError::InvalidDirection(_) => "BAD_USER_INPUT",
        DomainError::Unauthorized(_) => "UNAUTHENTICATED",
        DomainError::Forbidden(_) => "FORBIDDEN",
        DomainError::NotFound { .. } | DomainError::CommentNotFound(_) => "NOT_FOUND",
        DomainError::AlreadyVoted => "ALREADY_VOTED",
        DomainError::Conflict(_) | DomainError::DuplicateVote => "CONFLICT",
        DomainError::Internal(_) => "INTERNAL_SERVER_ERROR",
    }
}

pub fn to_gql(err: DomainError) -> Error {
    let code = code(&err);
    let message = match &err {
        DomainError::Internal(detail) => {
            error!(%detail, "resolver failed");
            "Internal server error".to_string()
        }
        other => other.to_string(),
    };
    Error::new(message).extend_with(|_, ext| ext.set("code", code))
}

pub fn unauthenticated() -> Error {
    Error::new("You must be logged in").extend_with(|_, ext| ext.set("code", "UNAUTHENTICATED"))
}
