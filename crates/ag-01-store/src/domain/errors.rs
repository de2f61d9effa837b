//! Error types for the store adapter.
//!
//! Every variant is an infrastructure failure. Callers on the vote path
//! surface them as server errors; the finalizer logs them and moves on.

use thiserror::Error;

/// Store adapter errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or failed an I/O operation.
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    /// A stored value could not be encoded or decoded.
    #[error("Serialization failed for key {key}: {message}")]
    Serialization { key: String, message: String },

    /// An optimistic update lost the race too many times in a row.
    #[error("Contention on key {key}: gave up after {attempts} attempts")]
    Contention { key: String, attempts: usize },

    /// A stored value is structurally invalid (bad header, bad sequence).
    #[error("Corrupted entry for key {key}")]
    Corrupted { key: String },
}

impl StoreError {
    /// Build an `Unavailable` error from any displayable backend error.
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: err.to_string(),
        }
    }

    /// Always false: store failures are never caused by the client.
    pub fn is_client_error(&self) -> bool {
        false
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
