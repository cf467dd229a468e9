//! Catalog domain module.
//!
//! Items, sellers and per-seller inventory records, the stock classifier, and the
//! gateway traits the search and reservation layers consume. No IO lives here.

pub mod gateway;
pub mod model;
pub mod stock;

pub use gateway::{CatalogGateway, GatewayError, StockLedger};
pub use model::{CatalogRow, InventoryRecord, Item, Seller};
pub use stock::{classify, StockState, StockThresholds};
