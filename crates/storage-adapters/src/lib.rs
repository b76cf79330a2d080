//! # storage-adapters
//!
//! Implementations of the repository ports and the vote ledger.
//!
//! - [`memory::MemoryStore`]: always compiled, DashMap-backed.
//! - [`postgres::PgStore`]: feature `db-postgres`, sqlx over PostgreSQL.

pub mod memory;
#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
