//! Storage adapters.
//!
//! - `inmemory`: process-local stores used by tests and demos
//! - `sqlite`: durable store backed by sqlx

pub mod inmemory;
pub mod sqlite;

pub use inmemory::{InMemoryMessageRepository, InMemoryUserDirectory};
pub use sqlite::SqliteStore;
