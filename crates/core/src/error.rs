//! Errors raised by domain logic.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// stock availability, state machine misuse). Store and network failures belong
/// to the gateway layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A referenced record does not resolve.
    #[error("not found")]
    NotFound,

    /// The requested quantity exceeds what is on hand.
    #[error("insufficient stock (requested {requested}, available {available})")]
    InsufficientStock { requested: u32, available: u32 },

    /// A state machine was asked for a transition it does not allow.
    #[error("invalid transition: cannot {action} from {from}")]
    InvalidTransition { from: String, action: &'static str },

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn insufficient_stock(requested: u32, available: u32) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn invalid_transition(from: impl core::fmt::Display, action: &'static str) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            action,
        }
    }
}
