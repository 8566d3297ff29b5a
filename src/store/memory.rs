use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FetchReport, LogStore, PersistenceError};
use crate::models::{LogEntry, RecordId, StoredEntry};

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryLogStore {
    rows: RwLock<Vec<StoredEntry>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl LogStore for MemoryLogStore {
    async fn insert(&self, entry: LogEntry) -> Result<RecordId, PersistenceError> {
        let id = Uuid::new_v4();
        self.rows.write().await.push(StoredEntry {
            id,
            created_at: Utc::now(),
            entry,
        });
        Ok(id)
    }

    async fn fetch_all(&self) -> Result<FetchReport, PersistenceError> {
        let mut entries = self.rows.read().await.clone();
        entries.sort_by_key(|row| (row.entry.date, row.created_at));
        Ok(FetchReport {
            entries,
            ..FetchReport::default()
        })
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}
