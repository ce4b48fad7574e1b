//! Errors raised by the trap model itself.
//!
//! Everything above the engine (config, manager, CLI) works with
//! `anyhow::Result` and wraps these with context.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrapError {
    /// Quota is negative, fractional, non-finite or larger than the catch.
    #[error("invalid harvest request: requested {requested}, but {available} fish are in the trap")]
    InvalidHarvestRequest { requested: f64, available: f64 },

    #[error("invalid trap geometry: {0}")]
    InvalidGeometry(String),
}

pub type TrapResult<T> = Result<T, TrapError>;
