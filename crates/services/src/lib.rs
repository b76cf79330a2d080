//! # services
//!
//! Business logic for Rusty-Blog. Every service receives its ports as
//! `Arc<dyn Trait>` so adapters can be swapped without touching this crate.

pub mod comment_service;
pub mod post_service;
pub mod user_service;
pub mod validation;
pub mod vote_service;

pub use comment_service::CommentService;
pub use post_service::PostService;
pub use user_service::UserService;
pub use vote_service::VoteService;
