//! JSON seed documents for the in-memory catalog.
//!
//! ```json
//! { "items": [...], "sellers": [...], "records": [...] }
//! ```
//!
//! Record prices are decimal strings with at most two places (`"4.50"`), the
//! same form the HTTP surface renders.

use std::path::Path;

use serde::Deserialize;

use stockfinder_catalog::{GatewayError, InventoryRecord, Item, Seller};
use stockfinder_core::{DomainError, InventoryRecordId, ItemId, Money, SellerId};

use super::InMemoryCatalog;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("reading seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing seed document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid seed entry: {0}")]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] GatewayError),
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub sellers: Vec<Seller>,
    #[serde(default)]
    pub records: Vec<RecordSeed>,
}

/// An inventory record as written in a seed document.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordSeed {
    pub id: InventoryRecordId,
    pub item_id: ItemId,
    pub seller_id: SellerId,
    pub unit_price: String,
    pub quantity: u32,
}

impl RecordSeed {
    fn into_record(self) -> Result<InventoryRecord, DomainError> {
        Ok(InventoryRecord {
            id: self.id,
            item_id: self.item_id,
            seller_id: self.seller_id,
            unit_price: self.unit_price.parse::<Money>()?,
            quantity: self.quantity,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub items: usize,
    pub sellers: usize,
    pub records: usize,
}

impl CatalogSeed {
    pub fn from_json(raw: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Validate every seller and record price, then insert everything. Nothing
    /// is inserted if any entry is invalid.
    pub fn apply(self, catalog: &InMemoryCatalog) -> Result<SeedSummary, SeedError> {
        let sellers = self
            .sellers
            .into_iter()
            .map(|s| Seller::new(s.id, s.name, s.address, s.phone, s.rating, s.review_count))
            .collect::<Result<Vec<_>, _>>()?;
        let records = self
            .records
            .into_iter()
            .map(RecordSeed::into_record)
            .collect::<Result<Vec<_>, _>>()?;

        let summary = SeedSummary {
            items: self.items.len(),
            sellers: sellers.len(),
            records: records.len(),
        };

        for item in self.items {
            catalog.insert_item(item)?;
        }
        for seller in sellers {
            catalog.insert_seller(seller)?;
        }
        for record in records {
            catalog.insert_record(record)?;
        }

        tracing::info!(
            items = summary.items,
            sellers = summary.sellers,
            records = summary.records,
            "catalog seeded"
        );
        Ok(summary)
    }
}
