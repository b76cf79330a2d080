//! rusty-blog/crates/domains/src/lib.rs
//!
//! The central domain types and interface definitions for Rusty-Blog.

pub mod errors;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use models::*;
pub use ports::*;
