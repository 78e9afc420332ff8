//! SQLite storage implementation

use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use crate::record::{Page, RepoRecord, StoredRepo};
use crate::{Error, Result};
use super::schema;

/// Connection state of the store, reported by the health check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Connecting,
    Disconnecting,
    Unknown,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Disconnected,
            1 => Self::Connected,
            2 => Self::Connecting,
            3 => Self::Disconnecting,
            _ => Self::Unknown,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Disconnected => 0,
            Self::Connected => 1,
            Self::Connecting => 2,
            Self::Disconnecting => 3,
            Self::Unknown => u8::MAX,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Connecting => "connecting",
            Self::Disconnecting => "disconnecting",
            Self::Unknown => "unknown",
        }
    }

    /// Only a connected store can serve requests
    pub fn is_ready(&self) -> bool {
        *self == Self::Connected
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a bulk upsert
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkWriteSummary {
    pub inserted: usize,
    pub updated: usize,
    pub failed: Vec<(String, String)>,
}

impl BulkWriteSummary {
    pub fn written(&self) -> usize {
        self.inserted + self.updated
    }
}

/// One page of stored records plus the total stored count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResults {
    pub repos: Vec<StoredRepo>,
    pub total_count: u64,
}

/// SQLite-backed store of repository records, keyed by url
pub struct RepoStore {
    conn: Mutex<Option<Connection>>,
    state: AtomicU8,
}

impl RepoStore {
    /// A store with no connection yet
    pub fn new() -> Self {
        Self {
            conn: Mutex::new(None),
            state: AtomicU8::new(ConnectionState::Disconnected.as_u8()),
        }
    }

    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::new();
        store.connect(path)?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let store = Self::new();
        store.establish(Connection::open_in_memory)?;
        Ok(store)
    }

    /// Connect to a database file, replacing any current connection.
    ///
    /// On failure the store is left disconnected.
    pub fn connect(&self, path: &Path) -> Result<()> {
        tracing::debug!("Connecting to database {:?}", path);
        self.establish(|| Connection::open(path))
    }

    fn establish(&self, open: impl FnOnce() -> rusqlite::Result<Connection>) -> Result<()> {
        self.set_state(ConnectionState::Connecting);
        let result = open().map_err(Error::from).and_then(|conn| {
            Self::initialize_schema(&conn)?;
            Ok(conn)
        });

        match result {
            Ok(conn) => {
                *self.lock() = Some(conn);
                self.set_state(ConnectionState::Connected);
                Ok(())
            }
            Err(e) => {
                *self.lock() = None;
                self.set_state(ConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Initialize the database schema
    fn initialize_schema(conn: &Connection) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Close the connection. Further reads and writes fail with
    /// [`Error::NotConnected`] until the store is connected again.
    pub fn close(&self) -> Result<()> {
        self.set_state(ConnectionState::Disconnecting);
        let conn = self.lock().take();
        let result = match conn {
            Some(conn) => conn.close().map_err(|(_, e)| Error::from(e)),
            None => Ok(()),
        };
        self.set_state(ConnectionState::Disconnected);
        result
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========== Write Operations ==========

    /// Update-or-insert every record by url in one transaction.
    ///
    /// A record that violates a constraint aborts only its own statement;
    /// the failure is reported in the summary and the rest still commit.
    pub fn upsert_many(&self, records: &[RepoRecord]) -> Result<BulkWriteSummary> {
        let mut summary = BulkWriteSummary::default();
        if records.is_empty() {
            return Ok(summary);
        }

        let mut guard = self.lock();
        let conn = guard.as_mut().ok_or(Error::NotConnected)?;
        let now = format_timestamp(&Utc::now());

        let tx = conn.transaction()?;
        {
            let mut exists = tx.prepare_cached("SELECT 1 FROM repos WHERE url = ?1")?;
            let mut upsert = tx.prepare_cached(schema::UPSERT_REPO)?;

            for record in records {
                let matched = match exists.query_row([&record.url], |_| Ok(())).optional() {
                    Ok(found) => found.is_some(),
                    Err(e) => {
                        summary.failed.push((record.url.clone(), e.to_string()));
                        continue;
                    }
                };

                let outcome = upsert.execute(params![
                    record.name,
                    record.url,
                    record.stars,
                    record.username,
                    record.description,
                    record.language,
                    now,
                ]);

                match outcome {
                    Ok(_) if matched => summary.updated += 1,
                    Ok(_) => summary.inserted += 1,
                    Err(e) => summary.failed.push((record.url.clone(), e.to_string())),
                }
            }
        }
        tx.commit()?;

        Ok(summary)
    }

    // ========== Read Operations ==========

    /// Records sorted by stars descending, then insertion order
    pub fn list(&self, page: Page) -> Result<StoredResults> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(Error::NotConnected)?;

        let mut stmt = conn.prepare_cached(
            "SELECT id, name, url, stars, username, description, language, created_at, updated_at
             FROM repos
             ORDER BY stars DESC, id ASC
             LIMIT ?1 OFFSET ?2",
        )?;
        let repos = stmt
            .query_map(params![page.limit() as i64, page.offset() as i64], row_to_repo)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let total_count = count_repos(conn)?;
        Ok(StoredResults { repos, total_count })
    }

    /// Get a record by url
    pub fn get(&self, url: &str) -> Result<Option<StoredRepo>> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(Error::NotConnected)?;

        conn.query_row(
            "SELECT id, name, url, stars, username, description, language, created_at, updated_at
             FROM repos WHERE url = ?1",
            [url],
            row_to_repo,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Count all stored records
    pub fn count(&self) -> Result<u64> {
        let guard = self.lock();
        let conn = guard.as_ref().ok_or(Error::NotConnected)?;
        count_repos(conn)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            repos: self.count()?,
            state: self.state(),
        })
    }
}

impl Default for RepoStore {
    fn default() -> Self {
        Self::new()
    }
}

fn count_repos(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM repos", [], |row| row.get(0))?;
    Ok(count as u64)
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}

/// Helper to convert a row to a StoredRepo
fn row_to_repo(row: &rusqlite::Row) -> rusqlite::Result<StoredRepo> {
    let created: String = row.get(7)?;
    let updated: String = row.get(8)?;

    Ok(StoredRepo {
        id: row.get(0)?,
        record: RepoRecord {
            name: row.get(1)?,
            url: row.get(2)?,
            stars: row.get(3)?,
            username: row.get(4)?,
            description: row.get(5)?,
            language: row.get(6)?,
        },
        created_at: parse_timestamp(7, &created)?,
        updated_at: parse_timestamp(8, &updated)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub repos: u64,
    pub state: ConnectionState,
}
