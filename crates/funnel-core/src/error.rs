//! Limiter-level error types.

use thiserror::Error;

use crate::ports::{LockError, StoreError};

/// Errors surfaced by a rate limit decision.
///
/// Lock contention is not represented here: it is a deny, not a failure.
#[derive(Debug, Error)]
pub enum LimiterError {
    #[error("Invalid leak rate: {0} (must be finite and non-negative)")]
    InvalidRate(f64),

    #[error("Lock backend failed: {0}")]
    Lock(#[from] LockError),

    #[error("Failed to load funnel state: {0}")]
    StoreRead(#[source] StoreError),

    /// The decision was computed but could not be durably recorded.
    #[error("Failed to save funnel state: {0}")]
    StoreWrite(#[source] StoreError),

    #[error("Corrupted funnel state: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode funnel state: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result type alias for limiter operations.
pub type Result<T> = std::result::Result<T, LimiterError>;
