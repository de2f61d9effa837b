//! # Aggregator Service
//!
//! Application service implementing `AggregatorApi`.
//!
//! The service holds no per-task state of its own: every request reads and
//! writes the shared store, so any number of handlers (or processes) can serve
//! votes for the same task concurrently.

use crate::domain::consensus::{evaluate, ConsensusConfig, ConsensusOutcome};
use crate::domain::errors::{AggregatorError, AggregatorResult};
use crate::domain::record::TaskVerificationRecord;
use crate::gate::FinalizationGate;
use crate::metrics;
use crate::ports::inbound::{AggregatorApi, PerformerView, SubmissionOutcome};
use ag_01_store::{update_json_guarded, KeyValueStore};
use ag_02_vote_validation::{ValidationError, VoteRequest, VoteValidationApi};
use async_trait::async_trait;
use shared_bus::{AggregatorEvent, EventPublisher};
use shared_types::{finished_key, verification_key, TaskId, TaskSubmission, TASK_STATE_TTL};
use std::sync::Arc;
use tracing::{debug, info};

/// Dependencies for `AggregatorService`.
pub struct AggregatorDependencies {
    pub validator: Arc<dyn VoteValidationApi>,
    pub store: Arc<dyn KeyValueStore>,
    pub events: Arc<dyn EventPublisher>,
    pub consensus: ConsensusConfig,
    /// Identifies this aggregator instance to the fleet finalizer.
    pub instance_id: String,
}

/// Vote path: validate, record, evaluate, finalize.
pub struct AggregatorService {
    validator: Arc<dyn VoteValidationApi>,
    store: Arc<dyn KeyValueStore>,
    events: Arc<dyn EventPublisher>,
    gate: FinalizationGate,
    consensus: ConsensusConfig,
}

impl AggregatorService {
    pub fn new(deps: AggregatorDependencies) -> Self {
        Self {
            gate: FinalizationGate::new(deps.store.clone(), deps.instance_id),
            validator: deps.validator,
            store: deps.store,
            events: deps.events,
            consensus: deps.consensus,
        }
    }

    pub fn consensus(&self) -> &ConsensusConfig {
        &self.consensus
    }

    /// Atomically add `submission` to the task's record.
    ///
    /// The duplicate checks and the finished-marker check run inside the CAS
    /// loop, so two concurrent submissions for the same slot cannot both pass
    /// them and no attempt writes after it has seen the marker.
    pub async fn record_vote(
        &self,
        task_id: TaskId,
        submission: TaskSubmission,
    ) -> AggregatorResult<TaskVerificationRecord> {
        update_json_guarded(
            self.store.as_ref(),
            &verification_key(task_id),
            &finished_key(task_id),
            Some(TASK_STATE_TTL),
            |current: Option<TaskVerificationRecord>, finished| {
                if finished {
                    return Err(ValidationError::TaskAlreadyFinished(task_id).into());
                }
                let mut record = current.unwrap_or_default();
                record.insert(task_id, submission.clone())?;
                Ok(record)
            },
        )
        .await
    }

    async fn load_record(&self, task_id: TaskId) -> AggregatorResult<Option<TaskVerificationRecord>> {
        let Some(raw) = self.store.get(&verification_key(task_id)).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|e| AggregatorError::Serialization(e.to_string()))
    }

    async fn process(&self, request: VoteRequest) -> AggregatorResult<SubmissionOutcome> {
        let vote = self.validator.validate(&request).await?;
        let task_id = vote.task_id;
        let operator = vote.submission.address.clone();
        let role = vote.submission.role;

        let record = match self.record_vote(task_id, vote.submission).await {
            Err(e) if e.is_duplicate() => {
                self.resume_finalization(task_id).await?;
                return Err(e);
            }
            other => other?,
        };

        metrics::record_vote_accepted(role.as_str());
        debug!(
            task_id,
            operator = %operator,
            role = %role,
            attesters = record.attester_count(),
            "Vote recorded"
        );
        self.events
            .publish(AggregatorEvent::VoteAccepted {
                task_id,
                operator,
                role,
            })
            .await;

        let outcome = evaluate(&record, &self.consensus);
        if !outcome.is_decided() {
            return Ok(SubmissionOutcome::Accepted);
        }
        self.hand_off(task_id, &record, &outcome).await?;
        Ok(SubmissionOutcome::Decided(outcome))
    }

    /// Pass a decided record through the gate. Returns whether this call
    /// performed the hand-off.
    async fn hand_off(
        &self,
        task_id: TaskId,
        record: &TaskVerificationRecord,
        outcome: &ConsensusOutcome,
    ) -> AggregatorResult<bool> {
        let Some(performer) = record.performer.as_ref() else {
            return Ok(false);
        };
        let Some(finalized) = self.gate.finalize(task_id, &performer.address, outcome).await? else {
            return Ok(false);
        };

        metrics::record_task_finalized(outcome.label());
        self.events
            .publish(AggregatorEvent::TaskFinalized {
                task_id,
                performer: finalized.operator,
                result: finalized.result,
            })
            .await;
        Ok(true)
    }

    /// Re-run the decision on the stored record.
    ///
    /// A submission whose hand-off failed after its vote was recorded comes
    /// back as a duplicate when retried.
    async fn resume_finalization(&self, task_id: TaskId) -> AggregatorResult<()> {
        let Some(record) = self.load_record(task_id).await? else {
            return Ok(());
        };
        let outcome = evaluate(&record, &self.consensus);
        if outcome.is_decided() && self.hand_off(task_id, &record, &outcome).await? {
            info!(task_id, outcome = outcome.label(), "Finalization resumed on resubmitted vote");
        }
        Ok(())
    }
}

#[async_trait]
impl AggregatorApi for AggregatorService {
    async fn submit_vote(&self, request: VoteRequest) -> AggregatorResult<SubmissionOutcome> {
        let task_id = request.task_id;
        let outcome = self.process(request).await;

        match &outcome {
            Ok(SubmissionOutcome::Decided(decision)) => {
                info!(task_id, outcome = decision.label(), "Local consensus reached");
            }
            Ok(SubmissionOutcome::Accepted) => {}
            Err(e) => {
                metrics::record_vote_rejected(e.kind());
                debug!(task_id, kind = e.kind(), error = %e, "Vote not recorded");
            }
        }
        outcome
    }

    async fn performer_of(&self, task_id: TaskId) -> AggregatorResult<Option<PerformerView>> {
        Ok(self
            .load_record(task_id)
            .await?
            .and_then(|record| record.performer)
            .map(|performer| PerformerView {
                result: performer.result,
                address: performer.address,
            }))
    }
}
