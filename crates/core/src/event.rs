//! Facts emitted by aggregates.

use chrono::{DateTime, Utc};

/// Something that happened to an aggregate. Never mutated after it is emitted.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name, e.g. `"reservation.confirmed"`. Used as the log/wire tag.
    fn event_type(&self) -> &'static str;

    /// Payload shape version for this event type.
    fn version(&self) -> u32;

    fn occurred_at(&self) -> DateTime<Utc>;
}
