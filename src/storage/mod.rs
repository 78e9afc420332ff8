//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with one table:
//! - repos(id, name, url UNIQUE, stars, username, description, language, created_at, updated_at)

pub mod schema;
pub mod sqlite;

pub use sqlite::{BulkWriteSummary, ConnectionState, DbStats, RepoStore, StoredResults};
