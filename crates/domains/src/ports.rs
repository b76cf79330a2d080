//! # Ports
//!
//! Any adapter must implement these traits to be used by the services.

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::{Comment, CommentEvent, Identity, NewComment, NewPost, Post, PostUpdate, User, Vote};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Account persistence.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn list(&self) -> Result<Vec<User>>;
    /// Fails with `Conflict` when the username is taken.
    async fn create(&self, username: &str, password_hash: &str) -> Result<User>;
}

/// Post persistence. Deleting a post cascades to its comments and their votes.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>>;
    async fn list(&self) -> Result<Vec<Post>>;
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>>;
    async fn create(&self, post: NewPost) -> Result<Post>;
    async fn update(&self, id: i64, update: PostUpdate) -> Result<Post>;
    async fn delete(&self, id: i64) -> Result<Post>;
}

/// Comment persistence, including the denormalized score.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>>;
    async fn list(&self) -> Result<Vec<Comment>>;
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>>;
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Comment>>;
    async fn create(&self, comment: NewComment) -> Result<Comment>;
    async fn update_content(&self, id: i64, content: &str) -> Result<Comment>;
    async fn delete(&self, id: i64) -> Result<Comment>;

    /// Adds `delta` to the score in a single storage operation, never as a
    /// read-modify-write in application code. Fails with `CommentNotFound`.
    async fn increment_score(&self, id: i64, delta: i32) -> Result<Comment>;
}

/// One vote per (voter, comment). Keyed by the voter's IP string.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait VoteLedger: Send + Sync {
    async fn find_vote(&self, voter_ip: &str, comment_id: i64) -> Result<Option<Vote>>;

    /// Inserts a new row. Fails with `DuplicateVote` if the natural key is
    /// already taken; callers are expected to have checked `find_vote`.
    async fn record_vote(&self, voter_ip: &str, comment_id: i64, value: i32) -> Result<Vote>;

    /// Compare-and-set: overwrites the value only if it still equals
    /// `expected`. Fails with `AlreadyVoted` when a concurrent revision got
    /// there first.
    async fn revise_vote(&self, vote_id: i64, expected: i32, value: i32) -> Result<Vote>;
}

/// Password hashing.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Bearer token issuance and verification.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Result<String>;
    fn verify(&self, token: &str) -> Result<Identity>;
}

/// Sink for comment events. Publishing never fails; with no subscribers the
/// event is dropped.
#[cfg_attr(any(test, feature = "testing"), automock)]
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: CommentEvent);
}
