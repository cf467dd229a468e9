//! Backing-store seams: the read-only catalog query and the stock ledger.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use stockfinder_core::{DomainError, InventoryRecordId, ItemId, SellerId};

use crate::model::{CatalogRow, InventoryRecord, Item, Seller};

/// The backing store could not answer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("backing store unavailable: {0}")]
    Unavailable(String),

    #[error("backing store timed out after {0:?}")]
    Timeout(Duration),
}

/// Read-only join over items × sellers × inventory records.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// All inventory records whose item name contains `text` (case-insensitive),
    /// joined with their item and seller. Unresolvable references come back as `None`.
    ///
    /// An empty result is not an error. On failure no rows are returned at all.
    async fn resolve(&self, text: &str) -> Result<Vec<CatalogRow>, GatewayError>;
}

#[async_trait]
impl<G> CatalogGateway for Arc<G>
where
    G: CatalogGateway + ?Sized,
{
    async fn resolve(&self, text: &str) -> Result<Vec<CatalogRow>, GatewayError> {
        (**self).resolve(text).await
    }
}

/// Mutable side of inventory: point lookups plus serialized per-record updates.
pub trait StockLedger: Send + Sync {
    fn record(&self, id: InventoryRecordId) -> Result<Option<InventoryRecord>, GatewayError>;

    fn item(&self, id: ItemId) -> Result<Option<Item>, GatewayError>;

    fn seller(&self, id: SellerId) -> Result<Option<Seller>, GatewayError>;

    /// Run `f` with exclusive access to one record.
    ///
    /// Calls for the same record are serialized. The mutation is kept only if `f`
    /// returns `Ok`; on `Err` the record is left as it was.
    fn with_record<T, E, F>(&self, id: InventoryRecordId, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut InventoryRecord) -> Result<T, E>,
        E: From<GatewayError> + From<DomainError>;
}

impl<L> StockLedger for Arc<L>
where
    L: StockLedger,
{
    fn record(&self, id: InventoryRecordId) -> Result<Option<InventoryRecord>, GatewayError> {
        (**self).record(id)
    }

    fn item(&self, id: ItemId) -> Result<Option<Item>, GatewayError> {
        (**self).item(id)
    }

    fn seller(&self, id: SellerId) -> Result<Option<Seller>, GatewayError> {
        (**self).seller(id)
    }

    fn with_record<T, E, F>(&self, id: InventoryRecordId, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut InventoryRecord) -> Result<T, E>,
        E: From<GatewayError> + From<DomainError>,
    {
        (**self).with_record(id, f)
    }
}
