//! Reservation and history storage abstractions with in-memory implementations.

pub mod history_store;
pub mod reservation_store;

pub use history_store::InMemoryHistoryStore;
pub use reservation_store::{InMemoryReservationStore, ReservationStore};
