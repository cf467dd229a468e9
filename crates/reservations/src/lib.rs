//! Reservations domain module.
//!
//! The hold lifecycle against one inventory record, implemented purely as
//! deterministic domain logic (no IO, no locking, no storage).

pub mod reservation;

pub use reservation::{
    CancelReservation, CompleteReservation, ConfirmReservation, CreateReservation, Reservation,
    ReservationCancelled, ReservationCommand, ReservationCompleted, ReservationConfirmed,
    ReservationCreated, ReservationEvent, ReservationStatus, StockEffect,
};
