use thiserror::Error;

use stockfinder_catalog::GatewayError;
use stockfinder_core::DomainError;

/// Failure of a reservation operation. Nothing is changed when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReservationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] GatewayError),
}
