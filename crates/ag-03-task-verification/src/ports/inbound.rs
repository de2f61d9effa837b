//! # Inbound Ports (Driving Ports / API)

use crate::domain::consensus::ConsensusOutcome;
use crate::domain::errors::AggregatorResult;
use ag_02_vote_validation::VoteRequest;
use async_trait::async_trait;
use serde::Serialize;
use shared_types::{OperatorAddress, TaskId};

/// Result of an accepted vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Recorded; the task is still pending.
    Accepted,
    /// Recorded, and the task now has a local decision.
    Decided(ConsensusOutcome),
}

/// Current performer of a task, as exposed on the read endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformerView {
    pub result: String,
    pub address: OperatorAddress,
}

/// Vote submission API.
///
/// Implementations must be thread-safe (`Send + Sync`); requests for the same
/// task may arrive concurrently.
#[async_trait]
pub trait AggregatorApi: Send + Sync {
    /// Validate, record and evaluate one vote.
    ///
    /// # Errors
    /// - `AggregatorError::Validation` - Admission check failed
    /// - `AggregatorError::PerformerAlreadySubmitted` / `AttesterAlreadySubmitted`
    /// - `AggregatorError::Storage` - Transient; the caller may resubmit
    async fn submit_vote(&self, request: VoteRequest) -> AggregatorResult<SubmissionOutcome>;

    /// The performer's submission for a task, if the record exists and has one.
    async fn performer_of(&self, task_id: TaskId) -> AggregatorResult<Option<PerformerView>>;
}
