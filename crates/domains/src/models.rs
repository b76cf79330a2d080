//! # Domain Models
//!
//! These structs represent the core entities of Rusty-Blog.
//! Identifiers are database-assigned integers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A registered account. Owns posts and comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string. Never leaves the process.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A blog post. Ownership root for its comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    /// Short summary shown in listings
    pub perex: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A post together with its comments, as returned by the post listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithComments {
    #[serde(flatten)]
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub post_id: i64,
    /// Net votes. Always equals the sum of `Vote::value` for this comment.
    pub score: i32,
}

/// One voter's current stance on one comment. `(ip, comment_id)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: i64,
    pub ip: String,
    pub comment_id: i64,
    pub value: i32,
    pub created_at: DateTime<Utc>,
}

/// Requested vote direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Upvote,
    Downvote,
}

impl VoteDirection {
    /// Signed magnitude stored in the ledger.
    pub fn value(self) -> i32 {
        match self {
            VoteDirection::Upvote => 1,
            VoteDirection::Downvote => -1,
        }
    }
}

impl FromStr for VoteDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(VoteDirection::Upvote),
            "downvote" => Ok(VoteDirection::Downvote),
            other => Err(DomainError::InvalidDirection(other.to_string())),
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteDirection::Upvote => f.write_str("upvote"),
            VoteDirection::Downvote => f.write_str("downvote"),
        }
    }
}

/// How a successful vote touched the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChange {
    /// First vote by this voter on the comment.
    Recorded,
    /// An existing vote flipped to the opposite direction.
    Revised,
}

/// Result of reconciling a vote against the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteOutcome {
    pub comment: Comment,
    pub change: VoteChange,
}

/// Input for creating a post.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub perex: String,
    pub content: String,
    pub author_id: i64,
}

/// Partial update of a post. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub perex: Option<String>,
    pub content: Option<String>,
}

/// Input for creating a comment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub content: String,
    pub post_id: i64,
    pub author_id: i64,
}

/// The authenticated caller, as recovered from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

/// Comment lifecycle events fanned out to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentEvent {
    Added(Comment),
    Updated(Comment),
    Deleted(Comment),
    VoteUpdated(Comment),
}

impl CommentEvent {
    pub fn comment(&self) -> &Comment {
        match self {
            CommentEvent::Added(c)
            | CommentEvent::Updated(c)
            | CommentEvent::Deleted(c)
            | CommentEvent::VoteUpdated(c) => c,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CommentEvent::Added(_) => "COMMENT_ADDED",
            CommentEvent::Updated(_) => "COMMENT_UPDATED",
            CommentEvent::Deleted(_) => "COMMENT_DELETED",
            CommentEvent::VoteUpdated(_) => "VOTE_UPDATED",
        }
    }
}
