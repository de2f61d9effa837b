//! Error types for the vote path.

use ag_01_store::StoreError;
use ag_02_vote_validation::ValidationError;
use shared_types::{OperatorAddress, TaskId};
use thiserror::Error;

/// Errors returned by `AggregatorApi`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AggregatorError {
    /// The vote failed an admission check.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The task already has a performer submission.
    #[error("Performer already submitted for task {0}")]
    PerformerAlreadySubmitted(TaskId),

    /// This attester already voted on the task.
    #[error("Attester {address} already submitted for task {task_id}")]
    AttesterAlreadySubmitted {
        task_id: TaskId,
        address: OperatorAddress,
    },

    /// The store failed or gave up under contention.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// A value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AggregatorError {
    /// Client errors are terminal for the request and map to 4xx.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Validation(e) => e.is_client_error(),
            Self::PerformerAlreadySubmitted(_) | Self::AttesterAlreadySubmitted { .. } => true,
            Self::Storage(_) | Self::Serialization(_) => false,
        }
    }

    /// The vote collides with one already in the task's record.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::PerformerAlreadySubmitted(_) | Self::AttesterAlreadySubmitted { .. }
        )
    }

    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.kind(),
            Self::PerformerAlreadySubmitted(_) => "performer_already_submitted",
            Self::AttesterAlreadySubmitted { .. } => "attester_already_submitted",
            Self::Storage(_) => "storage",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// Result type for the vote path.
pub type AggregatorResult<T> = Result<T, AggregatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AggregatorError::PerformerAlreadySubmitted(1).is_client_error());
        assert!(AggregatorError::from(ValidationError::InvalidSignature).is_client_error());
        assert!(
            !AggregatorError::from(ValidationError::Storage(StoreError::unavailable("x")))
                .is_client_error()
        );
        assert!(!AggregatorError::Serialization("bad".into()).is_client_error());
    }

    #[test]
    fn test_validation_errors_display_transparently() {
        let err = AggregatorError::from(ValidationError::TaskAlreadyFinished(4));
        assert_eq!(err.to_string(), "Task 4 already finished");
        assert_eq!(err.kind(), "task_already_finished");
    }
}
