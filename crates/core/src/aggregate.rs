//! Aggregate root traits for state-machine style domain models.

use crate::error::{DomainError, DomainResult};

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// Corresponds to the number of events applied.
    fn version(&self) -> u64;
}

/// Optimistic concurrency expectation for an aggregate write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// The aggregate must not exist yet.
    New,
    /// Require the stored aggregate to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    /// `actual` is `None` when nothing is stored yet.
    pub fn matches(self, actual: Option<u64>) -> bool {
        match (self, actual) {
            (ExpectedVersion::New, None) => true,
            (ExpectedVersion::Exact(v), Some(a)) => v == a,
            _ => false,
        }
    }

    pub fn check(self, actual: Option<u64>) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual:?})"
            )))
        }
    }
}

/// A state machine driven by commands.
///
/// `handle` decides (no mutation, no IO) and `apply` evolves state from the
/// resulting events. Callers that persist state do so after `execute` returns.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    /// Evolve state from one event; bumps `version()` by one.
    fn apply(&mut self, event: &Self::Event);

    /// Decide which events a command produces in the current state.
    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Handle a command and apply the resulting events in one step.
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle(command)?;
        for event in &events {
            self.apply(event);
        }
        Ok(events)
    }
}
