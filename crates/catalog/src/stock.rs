//! Stock classification: quantity on hand → displayed stock state.
//!
//! The state is always derived; nothing stores it independently of quantity.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use stockfinder_core::{DomainError, DomainResult};

/// Classified availability of an inventory record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockState {
    InStock,
    LowStock,
    OutOfStock,
}

impl StockState {
    /// Wire token (`in_stock`, `low_stock`, `out_of_stock`).
    pub fn as_str(self) -> &'static str {
        match self {
            StockState::InStock => "in_stock",
            StockState::LowStock => "low_stock",
            StockState::OutOfStock => "out_of_stock",
        }
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            StockState::InStock => "In Stock",
            StockState::LowStock => "Low Stock",
            StockState::OutOfStock => "Out of Stock",
        }
    }

    pub fn is_available(self) -> bool {
        !matches!(self, StockState::OutOfStock)
    }
}

impl core::fmt::Display for StockState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(StockState::InStock),
            "low_stock" => Ok(StockState::LowStock),
            "out_of_stock" => Ok(StockState::OutOfStock),
            other => Err(DomainError::validation(format!("unknown stock state: {other}"))),
        }
    }
}

/// Classifier thresholds. The zero threshold is fixed at 0; `low` is configurable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockThresholds {
    low: u32,
}

impl StockThresholds {
    pub const DEFAULT_LOW: u32 = 5;

    /// `low` must be strictly greater than the zero threshold.
    pub fn new(low: u32) -> DomainResult<Self> {
        if low == 0 {
            return Err(DomainError::validation("low stock threshold must be positive"));
        }
        Ok(Self { low })
    }

    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn classify(&self, quantity: u32) -> StockState {
        classify(quantity, *self)
    }
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            low: Self::DEFAULT_LOW,
        }
    }
}

/// `q <= 0` → out of stock, `0 < q <= low` → low stock, otherwise in stock.
pub fn classify(quantity: u32, thresholds: StockThresholds) -> StockState {
    if quantity == 0 {
        StockState::OutOfStock
    } else if quantity <= thresholds.low {
        StockState::LowStock
    } else {
        StockState::InStock
    }
}
