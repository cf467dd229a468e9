//! Typeahead search over the catalog join.
//!
//! Every call to [`SearchEngine::search`] is tagged with a generation number
//! taken from a monotonically increasing counter. When a response arrives it may
//! update the visible results only if its generation is still the newest one
//! issued; anything older is dropped, whatever order responses complete in.
//!
//! Superseded calls are not aborted. They finish (or time out) and are ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;

use stockfinder_catalog::{CatalogGateway, CatalogRow, GatewayError, StockThresholds};
use stockfinder_core::UserId;

use crate::history::{HistoryRecorder, HistoryStore};
use crate::query::{SearchQuery, SearchResultRow};
use crate::ranking::{rank, DistanceSource};

/// Sequence number of one search invocation. Generation 0 means "nothing yet".
pub type Generation = u64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The newest search could not reach the catalog. Visible results are unchanged.
    #[error("search {generation} failed: {source}")]
    SearchFailed {
        generation: Generation,
        #[source]
        source: GatewayError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub thresholds: StockThresholds,
    /// Upper bound on any single backing-store call.
    pub store_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            thresholds: StockThresholds::default(),
            store_timeout: Duration::from_secs(2),
        }
    }
}

/// What happened to one `search` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Blank query: nothing was issued.
    Skipped,
    /// This generation's rows are now the visible results.
    Applied {
        generation: Generation,
        rows: Vec<SearchResultRow>,
    },
    /// A newer generation was issued before this one completed; its answer was dropped.
    Superseded {
        generation: Generation,
        latest: Generation,
    },
}

/// The result set currently on display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleResults {
    pub generation: Generation,
    pub query: Option<SearchQuery>,
    pub rows: Vec<SearchResultRow>,
}

pub struct SearchEngine<G, H> {
    gateway: G,
    history: HistoryRecorder<H>,
    distances: Option<Arc<dyn DistanceSource>>,
    config: SearchConfig,
    issued: AtomicU64,
    visible: Mutex<VisibleResults>,
}

impl<G, H> SearchEngine<G, H>
where
    G: CatalogGateway,
    H: HistoryStore + 'static,
{
    pub fn new(gateway: G, history: H, config: SearchConfig) -> Self {
        Self {
            gateway,
            history: HistoryRecorder::new(history, config.store_timeout),
            distances: None,
            config,
            issued: AtomicU64::new(0),
            visible: Mutex::new(VisibleResults::default()),
        }
    }

    pub fn with_distances(mut self, source: Arc<dyn DistanceSource>) -> Self {
        self.distances = Some(source);
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryRecorder<H> {
        &self.history
    }

    /// Highest generation issued so far.
    pub fn latest_generation(&self) -> Generation {
        self.issued.load(Ordering::SeqCst)
    }

    /// Snapshot of the results currently on display.
    pub fn visible(&self) -> VisibleResults {
        self.visible
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run one search.
    ///
    /// Hands the query to the history recorder for an identified caller (without
    /// waiting on it), resolves the join, drops
    /// dangling rows, classifies, filters and ranks. The rows become visible only
    /// if no newer search has been issued in the meantime.
    pub async fn search(
        &self,
        user: Option<UserId>,
        query: &SearchQuery,
    ) -> Result<SearchOutcome, SearchError> {
        if query.is_blank() {
            return Ok(SearchOutcome::Skipped);
        }

        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, query = %query.text, "search issued");

        if let Some(user_id) = user {
            // Detached: a slow history store must not hold up the search.
            let _ = self.history.record(user_id, &query.text);
        }

        let fetched = self.fetch(query.text.trim()).await;

        let latest = self.latest_generation();
        if generation != latest {
            tracing::debug!(generation, latest, "dropping superseded search response");
            return Ok(SearchOutcome::Superseded { generation, latest });
        }

        let raw = match fetched {
            Ok(raw) => raw,
            Err(source) => {
                tracing::warn!(generation, error = %source, "catalog lookup failed");
                return Err(SearchError::SearchFailed { generation, source });
            }
        };

        let rows = self.assemble(raw, query);
        Ok(self.publish(generation, query, rows))
    }

    async fn fetch(&self, text: &str) -> Result<Vec<CatalogRow>, GatewayError> {
        let timeout = self.config.store_timeout;
        match tokio::time::timeout(timeout, self.gateway.resolve(text)).await {
            Ok(r) => r,
            Err(_) => Err(GatewayError::Timeout(timeout)),
        }
    }

    fn assemble(&self, raw: Vec<CatalogRow>, query: &SearchQuery) -> Vec<SearchResultRow> {
        let thresholds = self.config.thresholds;
        let rows = raw
            .into_iter()
            .filter_map(CatalogRow::resolved)
            .map(|(record, item, seller)| SearchResultRow {
                stock_state: record.stock_state(&thresholds),
                distance_km: self
                    .distances
                    .as_ref()
                    .and_then(|d| d.distance_km(seller.id)),
                record,
                item,
                seller,
            })
            .filter(|row| query.filter.matches(row.stock_state))
            .collect();

        rank(rows, query.sort)
    }

    /// Swap in `rows` unless a newer generation got there first.
    fn publish(
        &self,
        generation: Generation,
        query: &SearchQuery,
        rows: Vec<SearchResultRow>,
    ) -> SearchOutcome {
        let mut visible = self.visible.lock().unwrap_or_else(PoisonError::into_inner);

        // Re-checked under the lock: a newer search may have been issued while ranking.
        let latest = self.latest_generation();
        if generation != latest || generation <= visible.generation {
            tracing::debug!(generation, latest, "dropping superseded search response");
            return SearchOutcome::Superseded { generation, latest };
        }

        *visible = VisibleResults {
            generation,
            query: Some(query.clone()),
            rows: rows.clone(),
        };
        tracing::info!(generation, rows = rows.len(), "search results applied");

        SearchOutcome::Applied { generation, rows }
    }
}
