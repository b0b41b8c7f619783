//! Error types for snapsave-core

use thiserror::Error;

/// Result type alias using snapsave-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in snapsave-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The store reported a non-conflict error; never retried
    #[error("Store error: {0}")]
    Store(String),

    /// Conflict resolution ran out of its retry budget
    #[error("Could not resolve snapshot conflicts")]
    RetriesExhausted,

    /// IO error while reading or writing snapshot bytes
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Slot name failed validation
    #[error("Invalid slot name: {0}")]
    InvalidSlotName(String),

    /// Save slot not found
    #[error("Save slot not found: {0}")]
    SlotNotFound(String),

    /// A snapshot handle was used after commit or supersession
    #[error("Snapshot handle is no longer valid: {0}")]
    HandleInvalidated(String),

    /// A background store task failed to complete
    #[error("Background task failed: {0}")]
    Background(String),
}
