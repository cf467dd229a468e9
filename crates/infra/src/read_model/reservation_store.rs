use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use stockfinder_catalog::GatewayError;
use stockfinder_core::{AggregateRoot, ExpectedVersion, ReservationId, UserId};
use stockfinder_reservations::Reservation;

use crate::error::ReservationError;

/// Create/read/update of reservations by identity. Nothing is ever deleted.
pub trait ReservationStore: Send + Sync {
    fn get(&self, id: ReservationId) -> Result<Option<Reservation>, GatewayError>;

    /// Write `reservation` if the stored version matches `expected`.
    fn save(&self, reservation: &Reservation, expected: ExpectedVersion) -> Result<(), ReservationError>;

    /// Newest first, at most `limit`.
    fn list_for_user(&self, user_id: UserId, limit: usize) -> Result<Vec<Reservation>, GatewayError>;
}

impl<S> ReservationStore for Arc<S>
where
    S: ReservationStore + ?Sized,
{
    fn get(&self, id: ReservationId) -> Result<Option<Reservation>, GatewayError> {
        (**self).get(id)
    }

    fn save(&self, reservation: &Reservation, expected: ExpectedVersion) -> Result<(), ReservationError> {
        (**self).save(reservation, expected)
    }

    fn list_for_user(&self, user_id: UserId, limit: usize) -> Result<Vec<Reservation>, GatewayError> {
        (**self).list_for_user(user_id, limit)
    }
}

/// In-memory reservation store for tests/dev.
#[derive(Debug)]
pub struct InMemoryReservationStore {
    inner: RwLock<HashMap<ReservationId, Reservation>>,
    available: AtomicBool,
}

impl Default for InMemoryReservationStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store going away (every call fails) or coming back.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), GatewayError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::Unavailable("reservation store unreachable".to_string()))
        }
    }
}

fn poisoned() -> GatewayError {
    GatewayError::Unavailable("lock poisoned".to_string())
}

impl ReservationStore for InMemoryReservationStore {
    fn get(&self, id: ReservationId) -> Result<Option<Reservation>, GatewayError> {
        self.ensure_available()?;
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    fn save(&self, reservation: &Reservation, expected: ExpectedVersion) -> Result<(), ReservationError> {
        self.ensure_available()?;
        let mut map = self.inner.write().map_err(|_| poisoned())?;

        let id = reservation.id_typed();
        let current = map.get(&id).map(|r| r.version());
        expected.check(current)?;

        map.insert(id, reservation.clone());
        Ok(())
    }

    fn list_for_user(&self, user_id: UserId, limit: usize) -> Result<Vec<Reservation>, GatewayError> {
        self.ensure_available()?;
        let map = self.inner.read().map_err(|_| poisoned())?;

        let mut mine: Vec<Reservation> = map
            .values()
            .filter(|r| r.user_id() == Some(user_id))
            .cloned()
            .collect();
        // UUIDv7 ids break ties between equal timestamps in creation order.
        mine.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id_typed().as_uuid().cmp(a.id_typed().as_uuid()))
        });
        mine.truncate(limit);
        Ok(mine)
    }
}
