//! Error types for the finalizer.

use ag_01_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Failure of the external settlement call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettlementError {
    /// The request never reached the ledger client.
    #[error("Settlement transport failed: {0}")]
    Transport(String),

    /// The ledger client answered with a failure.
    #[error("Settlement rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The call did not finish within the configured bound.
    #[error("Settlement timed out after {0:?}")]
    TimedOut(Duration),
}

impl SettlementError {
    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Rejected { .. } => "rejected",
            Self::TimedOut(_) => "timeout",
        }
    }
}

/// Finalizer errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FinalizerError {
    /// A popped queue entry could not be decoded; it is dropped.
    #[error("Malformed queue entry: {0}")]
    MalformedEntry(String),

    /// Store failure, including an undecodable tally. The entry is lost and
    /// the loop moves on.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl FinalizerError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedEntry(_) => "malformed",
            Self::Storage(_) => "storage",
        }
    }
}

/// Result type for finalizer operations
pub type FinalizerResult<T> = Result<T, FinalizerError>;
