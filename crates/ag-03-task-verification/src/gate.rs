//! # Finalization Gate
//!
//! Turns a local decision into a queued `FinalizedResult` at most once per
//! task. The claim is a single test-and-set on `finished:{taskId}`; whoever
//! creates the marker is the only caller allowed to push.
//!
//! If the push fails after a successful claim, the marker is deleted again so
//! a retried submission can re-decide. Only the claim holder ever pushes, so
//! the rollback cannot produce a second queue entry.

use crate::domain::consensus::ConsensusOutcome;
use crate::domain::errors::{AggregatorError, AggregatorResult};
use ag_01_store::KeyValueStore;
use shared_types::{
    finished_key, FinalizedResult, OperatorAddress, TaskId, FINALIZATION_QUEUE, TASK_STATE_TTL,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Exactly-once hand-off to the finalization queue.
pub struct FinalizationGate {
    store: Arc<dyn KeyValueStore>,
    /// Instance id stamped on every pushed entry.
    forwarder: String,
}

impl FinalizationGate {
    pub fn new(store: Arc<dyn KeyValueStore>, forwarder: impl Into<String>) -> Self {
        Self {
            store,
            forwarder: forwarder.into(),
        }
    }

    /// Claim the task and enqueue its result.
    ///
    /// Returns `Some` when this call performed the hand-off, `None` when the
    /// outcome is pending or another caller already finalized the task.
    pub async fn finalize(
        &self,
        task_id: TaskId,
        performer: &OperatorAddress,
        outcome: &ConsensusOutcome,
    ) -> AggregatorResult<Option<FinalizedResult>> {
        let Some(result) = outcome.settled_value() else {
            return Ok(None);
        };

        let finalized = FinalizedResult {
            task_id,
            operator: performer.clone(),
            result,
            forwarder: Some(self.forwarder.clone()),
        };
        let payload = finalized
            .encode()
            .map_err(|e| AggregatorError::Serialization(e.to_string()))?;

        let marker = finished_key(task_id);
        let claimed = self
            .store
            .set_if_absent(&marker, result.to_string().into_bytes(), Some(TASK_STATE_TTL))
            .await?;
        if !claimed {
            debug!(task_id, "Task already finalized by a concurrent evaluation");
            return Ok(None);
        }

        if let Err(e) = self.store.push(FINALIZATION_QUEUE, payload).await {
            error!(task_id, error = %e, "Failed to enqueue finalized result, releasing claim");
            if let Err(rollback) = self.store.delete(&marker).await {
                error!(task_id, error = %rollback, "Failed to release finished marker");
            }
            return Err(e.into());
        }

        info!(
            task_id,
            operator = %performer,
            result,
            outcome = outcome.label(),
            "Task finalized"
        );
        Ok(Some(finalized))
    }
}
