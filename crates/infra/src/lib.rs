//! Infrastructure layer: in-memory backing stores, reservation orchestration,
//! and process configuration.

pub mod catalog;
pub mod config;
pub mod error;
pub mod read_model;
pub mod reservation_service;

pub use catalog::{CatalogSeed, InMemoryCatalog, SeedError};
pub use config::AppConfig;
pub use error::ReservationError;
pub use read_model::{InMemoryHistoryStore, InMemoryReservationStore, ReservationStore};
pub use reservation_service::{ReservationService, ReservationSummary};
