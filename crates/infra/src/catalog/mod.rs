//! Catalog backing store adapters.

pub mod in_memory;
pub mod seed;

pub use in_memory::InMemoryCatalog;
pub use seed::{CatalogSeed, RecordSeed, SeedError, SeedSummary};
