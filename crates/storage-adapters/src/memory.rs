//! # In-memory storage
//!
//! DashMap-backed implementation of every repository port. Used by tests and
//! by the `memory` storage backend for local development. Data does not
//! survive a restart.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{
    Comment, CommentRepository, DomainError, NewComment, NewPost, Post, PostRepository,
    PostUpdate, Result, User, UserRepository, Vote, VoteLedger,
};

type VoteKey = (String, i64);

#[derive(Default)]
struct Sequence(AtomicI64);

impl Sequence {
    fn next(&self) -> i64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<i64, User>,
    usernames: DashMap<String, i64>,
    posts: DashMap<i64, Post>,
    comments: DashMap<i64, Comment>,
    votes: DashMap<VoteKey, Vote>,
    vote_keys: DashMap<i64, VoteKey>,
    user_ids: Sequence,
    post_ids: Sequence,
    comment_ids: Sequence,
    vote_ids: Sequence,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted<T: Clone>(map: &DashMap<i64, T>, keep: impl Fn(&T) -> bool) -> Vec<T> {
        let mut rows: Vec<(i64, T)> = map
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        rows.sort_by_key(|(id, _)| *id);
        rows.into_iter().map(|(_, row)| row).collect()
    }

    fn drop_votes_for(&self, comment_id: i64) {
        self.votes.retain(|(_, cid), _| *cid != comment_id);
        self.vote_keys.retain(|_, (_, cid)| *cid != comment_id);
    }

    fn drop_comment(&self, comment_id: i64) -> Option<Comment> {
        let (_, comment) = self.comments.remove(&comment_id)?;
        self.drop_votes_for(comment_id);
        Some(comment)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let id = match self.usernames.get(username) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn list(&self) -> Result<Vec<User>> {
        Ok(Self::sorted(&self.users, |_| true))
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User> {
        match self.usernames.entry(username.to_string()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!("username {username} is already taken"))),
            Entry::Vacant(slot) => {
                let user = User {
                    id: self.user_ids.next(),
                    username: username.to_string(),
                    password_hash: password_hash.to_string(),
                    created_at: Utc::now(),
                };
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>> {
        Ok(self.posts.get(&id).map(|p| p.clone()))
    }

    async fn list(&self) -> Result<Vec<Post>> {
        Ok(Self::sorted(&self.posts, |_| true))
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>> {
        Ok(Self::sorted(&self.posts, |p| p.author_id == author_id))
    }

    async fn create(&self, post: NewPost) -> Result<Post> {
        if !self.users.contains_key(&post.author_id) {
            return Err(DomainError::not_found("User", post.author_id));
        }
        let post = Post {
            id: self.post_ids.next(),
            title: post.title,
            perex: post.perex,
            content: post.content,
            author_id: post.author_id,
            created_at: Utc::now(),
        };
        self.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: i64, update: PostUpdate) -> Result<Post> {
        let mut post = self.posts.get_mut(&id).ok_or(DomainError::not_found("Post", id))?;
        if let Some(title) = update.title {
            post.title = title;
        }
        if let Some(perex) = update.perex {
            post.perex = perex;
        }
        if let Some(content) = update.content {
            post.content = content;
        }
        Ok(post.clone())
    }

    async fn delete(&self, id: i64) -> Result<Post> {
        let (_, post) = self.posts.remove(&id).ok_or(DomainError::not_found("Post", id))?;
        let orphaned: Vec<i64> = self
            .comments
            .iter()
            .filter(|c| c.post_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in orphaned {
            self.drop_comment(comment_id);
        }
        Ok(post)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>> {
        Ok(self.comments.get(&id).map(|c| c.clone()))
    }

    async fn list(&self) -> Result<Vec<Comment>> {
        Ok(Self::sorted(&self.comments, |_| true))
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        Ok(Self::sorted(&self.comments, |c| c.post_id == post_id))
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Comment>> {
        Ok(Self::sorted(&self.comments, |c| c.author_id == author_id))
    }

    async fn create(&self, comment: NewComment) -> Result<Comment> {
        if !self.posts.contains_key(&comment.post_id) {
            return Err(DomainError::not_found("Post", comment.post_id));
        }
        let comment = Comment {
            id: self.comment_ids.next(),
            content: comment.content,
            created_at: Utc::now(),
            author_id: comment.author_id,
            post_id: comment.post_id,
            score: 0,
        };
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<Comment> {
        let mut comment = self.comments.get_mut(&id).ok_or(DomainError::CommentNotFound(id))?;
        comment.content = content.to_string();
        Ok(comment.clone())
    }

    async fn delete(&self, id: i64) -> Result<Comment> {
        self.drop_comment(id).ok_or(DomainError::CommentNotFound(id))
    }

    async fn increment_score(&self, id: i64, delta: i32) -> Result<Comment> {
        // The shard write lock is held for the whole read-add-write.
        let mut comment = self.comments.get_mut(&id).ok_or(DomainError::CommentNotFound(id))?;
        comment.score += delta;
        Ok(comment.clone())
    }
}

#[async_trait]
impl VoteLedger for MemoryStore {
    async fn find_vote(&self, voter_ip: &str, comment_id: i64) -> Result<Option<Vote>> {
        Ok(self
            .votes
            .get(&(voter_ip.to_string(), comment_id))
            .map(|v| v.clone()))
    }

    async fn record_vote(&self, voter_ip: &str, comment_id: i64, value: i32) -> Result<Vote> {
        if !self.comments.contains_key(&comment_id) {
            return Err(DomainError::CommentNotFound(comment_id));
        }
        let key = (voter_ip.to_string(), comment_id);
        match self.votes.entry(key.clone()) {
            Entry::Occupied(_) => Err(DomainError::DuplicateVote),
            Entry::Vacant(slot) => {
                let vote = Vote {
                    id: self.vote_ids.next(),
                    ip: voter_ip.to_string(),
                    comment_id,
                    value,
                    created_at: Utc::now(),
                };
                self.vote_keys.insert(vote.id, key);
                slot.insert(vote.clone());
                Ok(vote)
            }
        }
    }

    async fn revise_vote(&self, vote_id: i64, expected: i32, value: i32) -> Result<Vote> {
        let key = self
            .vote_keys
            .get(&vote_id)
            .map(|k| k.clone())
            .ok_or(DomainError::not_found("Vote", vote_id))?;
        // Compare and write under the same entry guard.
        let mut vote = self.votes.get_mut(&key).ok_or(DomainError::not_found("Vote", vote_id))?;
        if vote.value != expected {
            return Err(DomainError::AlreadyVoted);
        }
        vote.value = value;
        Ok(vote.clone())
    }
}
