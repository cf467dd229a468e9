//! Search inputs (filter, sort criterion) and the assembled result row.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use stockfinder_catalog::{InventoryRecord, Item, Seller, StockState};
use stockfinder_core::DomainError;

/// Which classified rows survive. Non-`All` values are exact matches on the state.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    #[default]
    All,
    InStock,
    LowStock,
    OutOfStock,
}

impl StockFilter {
    pub fn matches(self, state: StockState) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::InStock => state == StockState::InStock,
            StockFilter::LowStock => state == StockState::LowStock,
            StockFilter::OutOfStock => state == StockState::OutOfStock,
        }
    }
}

impl FromStr for StockFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StockFilter::All),
            "in_stock" => Ok(StockFilter::InStock),
            "low_stock" => Ok(StockFilter::LowStock),
            "out_of_stock" => Ok(StockFilter::OutOfStock),
            other => Err(DomainError::validation(format!(
                "stock filter must be one of: all, in_stock, low_stock, out_of_stock (got {other})"
            ))),
        }
    }
}

/// Ordering applied to the filtered rows.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriterion {
    #[default]
    ByPrice,
    ByRating,
    ByDistance,
}

impl FromStr for SortCriterion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(SortCriterion::ByPrice),
            "rating" => Ok(SortCriterion::ByRating),
            "distance" => Ok(SortCriterion::ByDistance),
            other => Err(DomainError::validation(format!(
                "sort must be one of: price, rating, distance (got {other})"
            ))),
        }
    }
}

/// One submitted search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub filter: StockFilter,
    #[serde(default)]
    pub sort: SortCriterion,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: StockFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: SortCriterion) -> Self {
        self.sort = sort;
        self
    }

    /// Whitespace-only queries are no-ops.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A fully resolved, classified row. Assembled per query; never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultRow {
    pub record: InventoryRecord,
    pub item: Item,
    pub seller: Seller,
    pub stock_state: StockState,
    /// Externally supplied distance to the seller, if known.
    pub distance_km: Option<f64>,
}
