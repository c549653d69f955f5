//! Persistence module
//!
//! SQLite-based storage for search history.

pub mod connection;
pub mod history_store;
pub mod migrations;

pub use connection::{ConnectionPool, DatabaseError, IN_MEMORY, create_pool};
pub use history_store::SqliteHistoryStore;
