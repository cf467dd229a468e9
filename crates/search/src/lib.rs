//! Search over the catalog: stock filtering, deterministic ranking, stale-response
//! suppression, and best-effort query history.

pub mod engine;
pub mod history;
pub mod query;
pub mod ranking;

#[cfg(test)]
pub(crate) mod test_support;

pub use engine::{
    Generation, SearchConfig, SearchEngine, SearchError, SearchOutcome, VisibleResults,
};
pub use history::{HistoryEntry, HistoryError, HistoryRecorder, HistoryStore};
pub use query::{SearchQuery, SearchResultRow, SortCriterion, StockFilter};
pub use ranking::{rank, DistanceSource};
