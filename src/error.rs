//! Error types for the hydration store.

use thiserror::Error;

/// Rejected user input. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationError {
    /// Body weight outside of the accepted range.
    #[error("Please enter a valid weight between 30-200 kg (got {0})")]
    WeightOutOfRange(f64),

    /// Cup size must be at least 1 ml.
    #[error("Cup size must be a positive amount of milliliters (got {0})")]
    InvalidCupSize(u32),
}

/// Errors that can occur while talking to durable storage.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The state could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The persisted record could not be decoded.
    #[error("Persisted record is corrupt: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The storage namespace has no room left for the record.
    #[error("Storage quota exceeded: needed {needed} bytes, limit is {limit} bytes")]
    QuotaExceeded { needed: usize, limit: usize },

    /// No usable data directory on this platform.
    #[error("Unable to determine a data directory for this platform")]
    NoDataDir,
}
