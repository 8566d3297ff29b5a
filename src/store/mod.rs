//! Persistence gateway for health-log rows.
//!
//! The store is append-only: rows are inserted once and read back in bulk.
//! Reads are best-effort; a row that cannot be decoded is reported as a
//! [`DecodeSkip`] and the rest of the table is still returned.

use serde::Serialize;

use crate::models::{LogEntry, RecordId, StoredEntry};

pub mod decode;
pub mod memory;
pub mod postgres;

pub use memory::MemoryLogStore;
pub use postgres::PgLogStore;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("log store unreachable: {0}")]
    Connection(String),

    #[error("log store rejected credentials: {0}")]
    Authentication(String),

    #[error("log store query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => PersistenceError::Connection(err.to_string()),
            sqlx::Error::Database(db_err) if is_auth_failure(db_err.code().as_deref()) => {
                PersistenceError::Authentication(err.to_string())
            }
            _ => PersistenceError::Query(err.to_string()),
        }
    }
}

/// SQLSTATE class 28: invalid authorization specification.
fn is_auth_failure(code: Option<&str>) -> bool {
    code.is_some_and(|c| c.starts_with("28"))
}

/// A row dropped during a fetch because a required column could not be read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeSkip {
    pub row_id: Option<RecordId>,
    pub field: &'static str,
    pub reason: String,
}

/// An optional column that could not be read and was treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeWarning {
    pub row_id: Option<RecordId>,
    pub field: &'static str,
    pub reason: String,
}

/// Result of a full-table read: every decodable row ordered by date
/// ascending, plus what was dropped or coerced along the way.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub entries: Vec<StoredEntry>,
    pub skipped: Vec<DecodeSkip>,
    pub warnings: Vec<DecodeWarning>,
}

#[async_trait::async_trait]
pub trait LogStore: Send + Sync {
    /// Appends one row. Duplicate submissions create duplicate rows.
    async fn insert(&self, entry: LogEntry) -> Result<RecordId, PersistenceError>;

    /// Reads the whole table, ordered by date ascending.
    async fn fetch_all(&self) -> Result<FetchReport, PersistenceError>;

    async fn ping(&self) -> Result<(), PersistenceError>;
}
