//! Reservation orchestration: the state machine plus the stock hold it implies.
//!
//! Every command runs inside [`StockLedger::with_record`] for the reservation's
//! inventory record:
//!
//! ```text
//! lock record
//!   ↓
//! load reservation (or start an empty one)
//!   ↓
//! handle command → events (pure)
//!   ↓
//! apply events to the reservation and their stock effect to the record
//!   ↓
//! save reservation (expected version)
//!   ↓
//! unlock record (changes kept only if every step succeeded)
//! ```
//!
//! Lock order is always record, then reservation store. Two reservers racing for
//! the last unit are serialized on the record lock; the second sees zero on hand.

use chrono::Utc;
use serde::Serialize;

use stockfinder_catalog::{InventoryRecord, StockLedger, StockThresholds};
use stockfinder_core::{
    Aggregate, AggregateRoot, DomainError, Event, ExpectedVersion, InventoryRecordId, Money,
    ReservationId, UserId,
};
use stockfinder_reservations::{
    CancelReservation, CompleteReservation, ConfirmReservation, CreateReservation, Reservation,
    ReservationCommand, ReservationEvent, ReservationStatus, StockEffect,
};

use crate::error::ReservationError;
use crate::read_model::ReservationStore;

/// A reservation joined with what a caller needs to display it.
///
/// Missing references (record, item or seller no longer resolving) leave the
/// corresponding fields empty rather than hiding the reservation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationSummary {
    pub id: ReservationId,
    pub record_id: Option<InventoryRecordId>,
    pub status: ReservationStatus,
    pub quantity: u32,
    pub total_price: Money,
    pub created_at: Option<chrono::DateTime<Utc>>,
    pub item_name: Option<String>,
    pub seller_name: Option<String>,
    pub seller_address: Option<String>,
}

#[derive(Debug)]
pub struct ReservationService<L, S> {
    ledger: L,
    store: S,
    thresholds: StockThresholds,
}

impl<L, S> ReservationService<L, S>
where
    L: StockLedger,
    S: ReservationStore,
{
    pub fn new(ledger: L, store: S, thresholds: StockThresholds) -> Self {
        Self {
            ledger,
            store,
            thresholds,
        }
    }

    /// Reserve `quantity` units of a record for `user_id`, holding them immediately.
    pub fn create(
        &self,
        user_id: UserId,
        record_id: InventoryRecordId,
        quantity: u32,
    ) -> Result<Reservation, ReservationError> {
        let reservation_id = ReservationId::new();

        let result: Result<Reservation, ReservationError> =
            self.ledger.with_record(record_id, |record| {
                let command = ReservationCommand::Create(CreateReservation {
                    reservation_id,
                    user_id,
                    record_id,
                    quantity,
                    unit_price: record.unit_price,
                    available: record.quantity,
                    stock_state: record.stock_state(&self.thresholds),
                    occurred_at: Utc::now(),
                });

                let mut reservation = Reservation::empty(reservation_id);
                self.run(&mut reservation, record, &command, ExpectedVersion::New)?;
                Ok(reservation)
            });

        match &result {
            Ok(r) => tracing::info!(
                reservation_id = %r.id_typed(),
                %user_id,
                %record_id,
                quantity,
                total_price = %r.total_price(),
                "reservation created"
            ),
            Err(e) => tracing::warn!(%user_id, %record_id, quantity, error = %e, "reservation rejected"),
        }
        result
    }

    pub fn confirm(&self, reservation_id: ReservationId) -> Result<Reservation, ReservationError> {
        self.transition(
            reservation_id,
            ReservationCommand::Confirm(ConfirmReservation {
                reservation_id,
                occurred_at: Utc::now(),
            }),
        )
    }

    /// Cancel and give the held quantity back to the record.
    pub fn cancel(&self, reservation_id: ReservationId) -> Result<Reservation, ReservationError> {
        self.transition(
            reservation_id,
            ReservationCommand::Cancel(CancelReservation {
                reservation_id,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn complete(&self, reservation_id: ReservationId) -> Result<Reservation, ReservationError> {
        self.transition(
            reservation_id,
            ReservationCommand::Complete(CompleteReservation {
                reservation_id,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn get(&self, reservation_id: ReservationId) -> Result<Reservation, ReservationError> {
        self.store
            .get(reservation_id)?
            .ok_or_else(|| DomainError::not_found().into())
    }

    /// The user's reservations, newest first, at most `limit`.
    pub fn list_for_user(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<ReservationSummary>, ReservationError> {
        let reservations = self.store.list_for_user(user_id, limit)?;
        reservations
            .into_iter()
            .map(|r| self.summarize(r))
            .collect()
    }

    fn summarize(&self, reservation: Reservation) -> Result<ReservationSummary, ReservationError> {
        let record = match reservation.record_id() {
            Some(id) => self.ledger.record(id)?,
            None => None,
        };
        let item = match &record {
            Some(r) => self.ledger.item(r.item_id)?,
            None => None,
        };
        let seller = match &record {
            Some(r) => self.ledger.seller(r.seller_id)?,
            None => None,
        };

        Ok(ReservationSummary {
            id: reservation.id_typed(),
            record_id: reservation.record_id(),
            status: reservation.status(),
            quantity: reservation.quantity(),
            total_price: reservation.total_price(),
            created_at: reservation.created_at(),
            item_name: item.map(|i| i.name),
            seller_name: seller.as_ref().map(|s| s.name.clone()),
            seller_address: seller.map(|s| s.address),
        })
    }

    fn transition(
        &self,
        reservation_id: ReservationId,
        command: ReservationCommand,
    ) -> Result<Reservation, ReservationError> {
        let record_id = self
            .get(reservation_id)?
            .record_id()
            .ok_or_else(DomainError::not_found)?;

        let result: Result<Reservation, ReservationError> =
            self.ledger.with_record(record_id, |record| {
                // Re-read under the record lock; another transition may have won.
                let mut reservation = self.get(reservation_id)?;
                let expected = ExpectedVersion::Exact(reservation.version());
                self.run(&mut reservation, record, &command, expected)?;
                Ok(reservation)
            });

        match &result {
            Ok(r) => tracing::info!(%reservation_id, status = %r.status(), "reservation updated"),
            Err(e) => tracing::warn!(%reservation_id, error = %e, "reservation transition rejected"),
        }
        result
    }

    /// Decide, apply to both the reservation and the record, then persist.
    /// Runs under the record lock; an error leaves the record untouched.
    fn run(
        &self,
        reservation: &mut Reservation,
        record: &mut InventoryRecord,
        command: &ReservationCommand,
        expected: ExpectedVersion,
    ) -> Result<(), ReservationError> {
        let events = reservation.execute(command)?;
        for event in &events {
            apply_stock_effect(record, event)?;
        }
        self.store.save(reservation, expected)?;

        for event in &events {
            tracing::debug!(
                reservation_id = %reservation.id_typed(),
                event = event.event_type(),
                occurred_at = %event.occurred_at(),
                on_hand = record.quantity,
                "reservation event applied"
            );
        }
        Ok(())
    }
}

fn apply_stock_effect(record: &mut InventoryRecord, event: &ReservationEvent) -> Result<(), DomainError> {
    match event.stock_effect() {
        StockEffect::Hold(quantity) => record.hold(quantity),
        StockEffect::Release(quantity) => record.release(quantity),
        StockEffect::Unchanged => Ok(()),
    }
}
