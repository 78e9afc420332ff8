//! # Repocache - GitHub repository search with a local result cache
//!
//! Repocache provides:
//! - A search proxy over the GitHub repository search API
//! - Url-keyed upsert of every search result into a SQLite store
//! - Star-sorted, paginated browsing of stored results
//! - A health report for the persistence layer
//! - An axum HTTP server and a CLI over the same operations

pub mod record;
pub mod github;
pub mod ingest;
pub mod storage;
pub mod server;
pub mod output;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use record::{Page, RepoRecord, StoredRepo};
pub use github::{GitHubClient, SearchResults};
pub use storage::{BulkWriteSummary, ConnectionState, RepoStore};

/// Result type alias for Repocache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Repocache operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("database is not connected")]
    NotConnected,

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),
}
