//! Error types surfaced by the engine.
//!
//! None of these are fatal: storage faults degrade to "continue unsaved",
//! purchase errors are reported back to the caller with no state change.

use thiserror::Error;

/// Failure of the persistence transport or of the payload it carries.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store does not exist in this environment (no window,
    /// private browsing with storage disabled, ...).
    #[error("storage is unavailable")]
    Unavailable,
    /// The backend rejected the operation (quota exceeded, security error).
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("failed to encode save payload: {0}")]
    Encode(#[source] serde_json::Error),
    /// A payload was found but could not be parsed.
    #[error("save payload is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}

/// Why an upgrade purchase was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PurchaseError {
    /// The id is not in the catalog. Indicates a wiring bug in the caller.
    #[error("unknown upgrade `{id}`")]
    UnknownUpgrade { id: String },
    #[error("insufficient funds: need {cost}, have {available}")]
    InsufficientFunds { cost: f64, available: f64 },
}
