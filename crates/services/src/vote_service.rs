//! Score reconciliation for per-IP comment votes.
//!
//! A voter (identified by IP string) holds at most one stance per comment.
//! The comment's `score` is a denormalized sum of those stances and is only
//! ever moved by deltas, so concurrent voters never lose each other's updates.
//!
//! The lookup, the ledger write and the score increment are three separate
//! storage calls. Races between requests from the same voter are settled by
//! the ledger write: two concurrent first votes collide on the unique key and
//! the loser fails with `DuplicateVote`; two concurrent flips both attempt a
//! compare-and-set from the old value and the loser fails with `AlreadyVoted`.
//! Only the request that changed the ledger moves the score.

use std::sync::Arc;

use domains::{
    CommentRepository, DomainError, Result, VoteChange, VoteDirection, VoteLedger, VoteOutcome,
};
use tracing::{debug, info};

pub struct VoteService {
    comments: Arc<dyn CommentRepository>,
    ledger: Arc<dyn VoteLedger>,
}

impl VoteService {
    pub fn new(comments: Arc<dyn CommentRepository>, ledger: Arc<dyn VoteLedger>) -> Self {
        Self { comments, ledger }
    }

    /// Applies a raw direction string (`"upvote"` / `"downvote"`).
    ///
    /// Unknown directions fail with `InvalidDirection` before storage is touched.
    pub async fn apply_vote(&self, comment_id: i64, direction: &str, voter_ip: &str) -> Result<VoteOutcome> {
        let direction: VoteDirection = direction.parse()?;
        self.apply(comment_id, direction, voter_ip).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn apply(&self, comment_id: i64, direction: VoteDirection, voter_ip: &str) -> Result<VoteOutcome> {
        let value = direction.value();

        if self.comments.find_by_id(comment_id).await?.is_none() {
            return Err(DomainError::CommentNotFound(comment_id));
        }

        match self.ledger.find_vote(voter_ip, comment_id).await? {
            None => {
                self.ledger.record_vote(voter_ip, comment_id, value).await?;
                let comment = self.comments.increment_score(comment_id, value).await?;
                info!(score = comment.score, "vote recorded");
                Ok(VoteOutcome { comment, change: VoteChange::Recorded })
            }
            Some(existing) if existing.value == value => {
                debug!(vote_id = existing.id, "duplicate stance rejected");
                Err(DomainError::AlreadyVoted)
            }
            Some(existing) => {
                let revised = self.ledger.revise_vote(existing.id, existing.value, value).await?;
                let delta = revised.value - existing.value;
                let comment = self.comments.increment_score(comment_id, delta).await?;
                info!(score = comment.score, delta, "vote revised");
                Ok(VoteOutcome { comment, change: VoteChange::Revised })
            }
        }
    }
}
