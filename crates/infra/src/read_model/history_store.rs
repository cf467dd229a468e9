use std::sync::RwLock;

use async_trait::async_trait;

use stockfinder_core::UserId;
use stockfinder_search::{HistoryEntry, HistoryError, HistoryStore};

/// Append-only in-memory search history for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| HistoryError::Unavailable("lock poisoned".to_string()))?;
        entries.push(entry);
        Ok(())
    }

    async fn recent(&self, user_id: UserId, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| HistoryError::Unavailable("lock poisoned".to_string()))?;
        // Appends are detached from the search, so arrival order is not
        // submission order.
        let mut mine: Vec<HistoryEntry> = entries
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        mine.truncate(limit);
        Ok(mine)
    }
}
