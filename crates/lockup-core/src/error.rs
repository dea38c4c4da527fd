// crates/lockup-core/src/error.rs

use thiserror::Error;

/// Ledger-wide error types.
///
/// Every failure aborts the whole operation before anything is committed.
/// The message names the precondition that failed; `code()` gives a stable
/// machine-readable category.
#[derive(Debug, Error)]
pub enum LockupError {
    /// Rejected input (zero amount, unregistered pool, malformed address).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The position or ledger is not in a state that allows the operation.
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// An external collaborator (policy, token, registry) failed.
    #[error("External capability failure: {0}")]
    ExternalCapability(String),

    /// Fixed-point or integer arithmetic overflowed.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Storage layer error (RocksDB, lock poisoning).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LockupError {
    /// Stable code for the error category.
    pub fn code(&self) -> &'static str {
        match self {
            LockupError::InvalidArgument(_) => "invalid_argument",
            LockupError::IllegalState(_) => "illegal_state",
            LockupError::ExternalCapability(_) => "external_capability_failure",
            LockupError::Overflow(_) => "overflow",
            LockupError::Storage(_) => "storage",
            LockupError::Serialization(_) => "serialization",
        }
    }

    /// Shorthand for an overflow in the named quantity.
    pub fn overflow(what: &str) -> Self {
        LockupError::Overflow(format!("{} overflowed", what))
    }
}

impl From<serde_json::Error> for LockupError {
    fn from(e: serde_json::Error) -> Self {
        LockupError::Serialization(e.to_string())
    }
}
