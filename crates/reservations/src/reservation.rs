use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockfinder_catalog::StockState;
use stockfinder_core::{
    Aggregate, AggregateRoot, DomainError, Event, InventoryRecordId, Money, ReservationId, UserId,
};

/// Reservation status lifecycle.
///
/// `pending → confirmed → completed`, with `cancelled` reachable from
/// `pending` and `confirmed`. `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }

    /// Whether the reserved quantity is currently withheld from the record.
    pub fn holds_stock(self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }
}

impl core::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate root: Reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    id: ReservationId,
    user_id: Option<UserId>,
    record_id: Option<InventoryRecordId>,
    quantity: u32,
    total_price: Money,
    status: ReservationStatus,
    created_at: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl Reservation {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: ReservationId) -> Self {
        Self {
            id,
            user_id: None,
            record_id: None,
            quantity: 0,
            total_price: Money::ZERO,
            status: ReservationStatus::Pending,
            created_at: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ReservationId {
        self.id
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn record_id(&self) -> Option<InventoryRecordId> {
        self.record_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

impl AggregateRoot for Reservation {
    type Id = ReservationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateReservation.
///
/// Carries a snapshot of the record taken under its lock, so the decision is
/// made against the quantity that will actually be decremented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateReservation {
    pub reservation_id: ReservationId,
    pub user_id: UserId,
    pub record_id: InventoryRecordId,
    pub quantity: u32,
    pub unit_price: Money,
    pub available: u32,
    pub stock_state: StockState,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmReservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmReservation {
    pub reservation_id: ReservationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelReservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReservation {
    pub reservation_id: ReservationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteReservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteReservation {
    pub reservation_id: ReservationId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationCommand {
    Create(CreateReservation),
    Confirm(ConfirmReservation),
    Cancel(CancelReservation),
    Complete(CompleteReservation),
}

impl ReservationCommand {
    pub fn reservation_id(&self) -> ReservationId {
        match self {
            ReservationCommand::Create(c) => c.reservation_id,
            ReservationCommand::Confirm(c) => c.reservation_id,
            ReservationCommand::Cancel(c) => c.reservation_id,
            ReservationCommand::Complete(c) => c.reservation_id,
        }
    }
}

/// Event: ReservationCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationCreated {
    pub reservation_id: ReservationId,
    pub user_id: UserId,
    pub record_id: InventoryRecordId,
    pub quantity: u32,
    pub total_price: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReservationConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConfirmed {
    pub reservation_id: ReservationId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReservationCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationCancelled {
    pub reservation_id: ReservationId,
    pub released_quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReservationCompleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationCompleted {
    pub reservation_id: ReservationId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationEvent {
    Created(ReservationCreated),
    Confirmed(ReservationConfirmed),
    Cancelled(ReservationCancelled),
    Completed(ReservationCompleted),
}

/// What an event does to the record's quantity on hand.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockEffect {
    Hold(u32),
    Release(u32),
    Unchanged,
}

impl ReservationEvent {
    pub fn stock_effect(&self) -> StockEffect {
        match self {
            ReservationEvent::Created(e) => StockEffect::Hold(e.quantity),
            ReservationEvent::Cancelled(e) => StockEffect::Release(e.released_quantity),
            ReservationEvent::Confirmed(_) | ReservationEvent::Completed(_) => {
                StockEffect::Unchanged
            }
        }
    }
}

impl Event for ReservationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReservationEvent::Created(_) => "reservation.created",
            ReservationEvent::Confirmed(_) => "reservation.confirmed",
            ReservationEvent::Cancelled(_) => "reservation.cancelled",
            ReservationEvent::Completed(_) => "reservation.completed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ReservationEvent::Created(e) => e.occurred_at,
            ReservationEvent::Confirmed(e) => e.occurred_at,
            ReservationEvent::Cancelled(e) => e.occurred_at,
            ReservationEvent::Completed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Reservation {
    type Command = ReservationCommand;
    type Event = ReservationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ReservationEvent::Created(e) => {
                self.id = e.reservation_id;
                self.user_id = Some(e.user_id);
                self.record_id = Some(e.record_id);
                self.quantity = e.quantity;
                self.total_price = e.total_price;
                self.status = ReservationStatus::Pending;
                self.created_at = Some(e.occurred_at);
                self.created = true;
            }
            ReservationEvent::Confirmed(_) => {
                self.status = ReservationStatus::Confirmed;
            }
            ReservationEvent::Cancelled(_) => {
                self.status = ReservationStatus::Cancelled;
            }
            ReservationEvent::Completed(_) => {
                self.status = ReservationStatus::Completed;
            }
        }

        // +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        if !matches!(command, ReservationCommand::Create(_)) {
            self.ensure_created()?;
            self.ensure_reservation_id(command.reservation_id())?;
        }

        match command {
            ReservationCommand::Create(cmd) => self.handle_create(cmd),
            ReservationCommand::Confirm(cmd) => self.handle_confirm(cmd),
            ReservationCommand::Cancel(cmd) => self.handle_cancel(cmd),
            ReservationCommand::Complete(cmd) => self.handle_complete(cmd),
        }
    }
}

impl Reservation {
    fn ensure_reservation_id(&self, reservation_id: ReservationId) -> Result<(), DomainError> {
        if self.id != reservation_id {
            return Err(DomainError::validation("reservation_id mismatch"));
        }
        Ok(())
    }

    fn ensure_created(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateReservation) -> Result<Vec<ReservationEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("reservation already exists"));
        }
        self.ensure_reservation_id(cmd.reservation_id)?;

        if cmd.quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        if !cmd.stock_state.is_available() || cmd.quantity > cmd.available {
            return Err(DomainError::insufficient_stock(cmd.quantity, cmd.available));
        }

        let total_price = cmd
            .unit_price
            .checked_mul(cmd.quantity)
            .ok_or_else(|| DomainError::validation("total price overflow"))?;

        Ok(vec![ReservationEvent::Created(ReservationCreated {
            reservation_id: cmd.reservation_id,
            user_id: cmd.user_id,
            record_id: cmd.record_id,
            quantity: cmd.quantity,
            total_price,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_confirm(&self, cmd: &ConfirmReservation) -> Result<Vec<ReservationEvent>, DomainError> {
        if self.status != ReservationStatus::Pending {
            return Err(DomainError::invalid_transition(self.status, "confirm"));
        }

        Ok(vec![ReservationEvent::Confirmed(ReservationConfirmed {
            reservation_id: cmd.reservation_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelReservation) -> Result<Vec<ReservationEvent>, DomainError> {
        if !self.status.holds_stock() {
            return Err(DomainError::invalid_transition(self.status, "cancel"));
        }

        Ok(vec![ReservationEvent::Cancelled(ReservationCancelled {
            reservation_id: cmd.reservation_id,
            released_quantity: self.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_complete(
        &self,
        cmd: &CompleteReservation,
    ) -> Result<Vec<ReservationEvent>, DomainError> {
        if self.status != ReservationStatus::Confirmed {
            return Err(DomainError::invalid_transition(self.status, "complete"));
        }

        Ok(vec![ReservationEvent::Completed(ReservationCompleted {
            reservation_id: cmd.reservation_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
