use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use stockfinder_catalog::{
    CatalogGateway, CatalogRow, GatewayError, InventoryRecord, Item, Seller, StockLedger,
};
use stockfinder_core::{DomainError, Entity, InventoryRecordId, ItemId, SellerId};

#[derive(Debug, Default)]
struct Tables {
    items: HashMap<ItemId, Item>,
    sellers: HashMap<SellerId, Seller>,
    records: HashMap<InventoryRecordId, Arc<Mutex<InventoryRecord>>>,
    /// Insertion order of records, so joins come back in a stable order.
    order: Vec<InventoryRecordId>,
}

/// In-memory catalog: items, sellers, and inventory records behind per-record locks.
///
/// Intended for tests/dev. Reference data is seeded through the `insert_*`
/// methods; quantities change only through [`StockLedger::with_record`].
#[derive(Debug)]
pub struct InMemoryCatalog {
    tables: RwLock<Tables>,
    available: AtomicBool,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            available: AtomicBool::new(true),
        }
    }
}

fn poisoned() -> GatewayError {
    GatewayError::Unavailable("lock poisoned".to_string())
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backing store going away (every call fails) or coming back.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), GatewayError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::Unavailable("catalog store unreachable".to_string()))
        }
    }

    pub fn insert_item(&self, item: Item) -> Result<(), GatewayError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        tables.items.insert(item.key(), item);
        Ok(())
    }

    pub fn insert_seller(&self, seller: Seller) -> Result<(), GatewayError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        tables.sellers.insert(seller.key(), seller);
        Ok(())
    }

    /// Insert or replace a record. References are not checked; dangling
    /// records are legal and simply never show up in search results.
    pub fn insert_record(&self, record: InventoryRecord) -> Result<(), GatewayError> {
        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let id = record.key();
        if let Some(existing) = tables.records.get(&id) {
            let mut slot = existing.lock().map_err(|_| poisoned())?;
            *slot = record;
            return Ok(());
        }
        tables.records.insert(id, Arc::new(Mutex::new(record)));
        tables.order.push(id);
        Ok(())
    }

    fn record_slot(&self, id: InventoryRecordId) -> Result<Option<Arc<Mutex<InventoryRecord>>>, GatewayError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.records.get(&id).cloned())
    }
}

#[async_trait]
impl CatalogGateway for InMemoryCatalog {
    async fn resolve(&self, text: &str) -> Result<Vec<CatalogRow>, GatewayError> {
        self.ensure_available()?;

        let needle = text.to_lowercase();
        let tables = self.tables.read().map_err(|_| poisoned())?;

        let mut rows = Vec::new();
        for id in &tables.order {
            let Some(slot) = tables.records.get(id) else {
                continue;
            };
            let record = slot.lock().map_err(|_| poisoned())?.clone();

            let item = match tables.items.get(&record.item_id) {
                Some(item) if item.name_matches(&needle) => item.clone(),
                _ => continue,
            };
            let seller = tables.sellers.get(&record.seller_id).cloned();

            rows.push(CatalogRow {
                record,
                item: Some(item),
                seller,
            });
        }

        tracing::debug!(query = %text, rows = rows.len(), "catalog resolved");
        Ok(rows)
    }
}

impl StockLedger for InMemoryCatalog {
    fn record(&self, id: InventoryRecordId) -> Result<Option<InventoryRecord>, GatewayError> {
        self.ensure_available()?;
        match self.record_slot(id)? {
            Some(slot) => Ok(Some(slot.lock().map_err(|_| poisoned())?.clone())),
            None => Ok(None),
        }
    }

    fn item(&self, id: ItemId) -> Result<Option<Item>, GatewayError> {
        self.ensure_available()?;
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.items.get(&id).cloned())
    }

    fn seller(&self, id: SellerId) -> Result<Option<Seller>, GatewayError> {
        self.ensure_available()?;
        let tables = self.tables.read().map_err(|_| poisoned())?;
        Ok(tables.sellers.get(&id).cloned())
    }

    fn with_record<T, E, F>(&self, id: InventoryRecordId, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut InventoryRecord) -> Result<T, E>,
        E: From<GatewayError> + From<DomainError>,
    {
        self.ensure_available()?;
        let slot = self.record_slot(id)?.ok_or_else(DomainError::not_found)?;

        // The tables lock is released here; only this record is held from now on.
        let mut guard = slot.lock().map_err(|_| poisoned())?;

        let mut draft = guard.clone();
        let out = f(&mut draft)?;
        *guard = draft;
        Ok(out)
    }
}
