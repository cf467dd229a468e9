//! Query history: one append per submitted search, best effort.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;

use stockfinder_core::{HistoryEntryId, UserId};

/// Append-only record of one submitted query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryEntryId,
    pub user_id: UserId,
    pub query: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history store unavailable: {0}")]
    Unavailable(String),

    #[error("history store timed out after {0:?}")]
    Timeout(Duration),
}

/// Persistence for history entries.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// Newest first, at most `limit`.
    async fn recent(&self, user_id: UserId, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError>;
}

#[async_trait]
impl<S> HistoryStore for Arc<S>
where
    S: HistoryStore + ?Sized,
{
    async fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        (**self).append(entry).await
    }

    async fn recent(&self, user_id: UserId, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        (**self).recent(user_id, limit).await
    }
}

/// Side-channel recorder used by the search path.
///
/// `record` hands the append to a spawned task and returns at once; the task
/// gives up after the configured timeout. Failures are logged, never returned.
#[derive(Debug)]
pub struct HistoryRecorder<S> {
    store: Arc<S>,
    timeout: Duration,
}

impl<S> HistoryRecorder<S>
where
    S: HistoryStore + 'static,
{
    pub fn new(store: S, timeout: Duration) -> Self {
        Self {
            store: Arc::new(store),
            timeout,
        }
    }

    /// Must be called from within a Tokio runtime.
    pub fn record(&self, user_id: UserId, query: &str) -> JoinHandle<()> {
        let entry = HistoryEntry {
            id: HistoryEntryId::new(),
            user_id,
            query: query.to_string(),
            created_at: Utc::now(),
        };
        let store = Arc::clone(&self.store);
        let timeout = self.timeout;

        tokio::spawn(async move {
            let entry_id = entry.id;
            let result = match tokio::time::timeout(timeout, store.append(entry)).await {
                Ok(r) => r,
                Err(_) => Err(HistoryError::Timeout(timeout)),
            };

            match result {
                Ok(()) => tracing::debug!(%user_id, %entry_id, "search history recorded"),
                Err(e) => tracing::warn!(%user_id, error = %e, "failed to record search history"),
            }
        })
    }

    pub async fn recent(&self, user_id: UserId, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        match tokio::time::timeout(self.timeout, self.store.recent(user_id, limit)).await {
            Ok(r) => r,
            Err(_) => Err(HistoryError::Timeout(self.timeout)),
        }
    }
}
