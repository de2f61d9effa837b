//! # Validation Errors
//!
//! One variant per admission check, plus `Storage` for a failed read of the
//! finished marker. Everything except `Storage` is caused by the client and is
//! never retried.

use ag_01_store::StoreError;
use shared_types::{OperatorAddress, Role, TaskId};
use thiserror::Error;

/// Errors that reject a vote before it touches the task record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Timestamp {timestamp} outside window [{earliest}, {now}]")]
    StaleOrFutureTimestamp {
        timestamp: i64,
        earliest: i64,
        now: i64,
    },

    #[error("Malformed public key: {0}")]
    MalformedKey(String),

    #[error("Invalid result format for {role}: {result:?}")]
    InvalidResultFormat { role: Role, result: String },

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Task {0} already finished")]
    TaskAlreadyFinished(TaskId),

    #[error("Unknown operator: {0}")]
    UnknownOperator(OperatorAddress),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ValidationError {
    /// Whether the caller caused the rejection.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }

    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRole(_) => "invalid_role",
            Self::StaleOrFutureTimestamp { .. } => "stale_or_future_timestamp",
            Self::MalformedKey(_) => "malformed_key",
            Self::InvalidResultFormat { .. } => "invalid_result_format",
            Self::InvalidSignature => "invalid_signature",
            Self::TaskAlreadyFinished(_) => "task_already_finished",
            Self::UnknownOperator(_) => "unknown_operator",
            Self::Storage(_) => "storage",
        }
    }
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
