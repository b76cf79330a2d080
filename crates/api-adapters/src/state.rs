use std::sync::Arc;

use domains::{
    CommentRepository, PasswordHasher, PostRepository, TokenIssuer, UserRepository, VoteLedger,
};
use services::{CommentService, PostService, UserService, VoteService};

use crate::events::BroadcastEventBus;
use crate::metrics::Metrics;
use crate::rate_limit::RateLimiter;

/// The adapters a running server is wired from.
pub struct Ports {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub votes: Arc<dyn VoteLedger>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenIssuer>,
}

/// Shared state handed to every REST handler and GraphQL resolver.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub votes: Arc<VoteService>,
    pub events: Arc<BroadcastEventBus>,
    pub metrics: Arc<Metrics>,
    pub rate_limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    pub fn new(ports: Ports) -> Self {
        Self {
            users: Arc::new(UserService::new(ports.users, ports.hasher, ports.tokens)),
            posts: Arc::new(PostService::new(ports.posts.clone(), ports.comments.clone())),
            comments: Arc::new(CommentService::new(ports.comments.clone(), ports.posts)),
            votes: Arc::new(VoteService::new(ports.comments, ports.votes)),
            events: Arc::new(BroadcastEventBus::default()),
            metrics: Arc::new(Metrics::new()),
            rate_limiter: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(Arc::new(limiter));
        self
    }
}
