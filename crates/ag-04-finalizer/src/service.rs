//! # Finalizer Service
//!
//! Single consumption loop over the finalization queue.
//!
//! ```text
//! blocking_pop(task_queue)
//!        │ decode (malformed → drop)
//!        ↓
//! settled:{id}? ──yes──→ AlreadySettled
//!        │ no
//!        ↓
//! update_json(tally:{id}) ──→ count < fleet threshold ──→ Tallied
//!        │ count ≥ fleet threshold
//!        ↓
//! set_if_absent(settling:{id}) ──lost──→ SettlementInProgress
//!        │ won
//!        ↓
//! gateway.submit (bounded) ──ok──→ settled:{id}, cleanup ──→ Settled
//!        │ err / timeout
//!        ↓
//! release claim, keep tally ──→ SettlementFailed
//! ```

use crate::domain::{FinalizerConfig, ForwardTally, ResultTally};
use crate::error::{FinalizerError, FinalizerResult, SettlementError};
use crate::metrics;
use crate::ports::outbound::SettlementGateway;
use ag_01_store::{update_json, KeyValueStore};
use shared_bus::{AggregatorEvent, EventPublisher};
use shared_types::{
    settled_key, settling_key, tally_key, verification_key, FinalizedResult, TaskId,
    FINALIZATION_QUEUE, TASK_STATE_TTL,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Pause after a failed pop before polling the queue again.
const POP_RETRY_DELAY: Duration = Duration::from_secs(1);

/// What happened to one queue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Counted; the fleet threshold is not met yet.
    Tallied { count: usize },
    /// The ledger accepted the result.
    Settled { result: i64 },
    /// The ledger call failed; the tally is kept for a later forward.
    SettlementFailed { reason: String },
    /// Another finalizer holds the settlement claim.
    SettlementInProgress,
    /// A late forward for a task that is already settled.
    AlreadySettled,
}

/// Dependencies for `Finalizer`.
pub struct FinalizerDependencies {
    pub store: Arc<dyn KeyValueStore>,
    pub gateway: Arc<dyn SettlementGateway>,
    pub events: Arc<dyn EventPublisher>,
    pub config: FinalizerConfig,
}

/// Redundant-forward finalizer.
pub struct Finalizer {
    store: Arc<dyn KeyValueStore>,
    gateway: Arc<dyn SettlementGateway>,
    events: Arc<dyn EventPublisher>,
    config: FinalizerConfig,
}

impl Finalizer {
    pub fn new(deps: FinalizerDependencies) -> Self {
        Self {
            store: deps.store,
            gateway: deps.gateway,
            events: deps.events,
            config: deps.config,
        }
    }

    /// Drain the queue until `shutdown` flips to `true` or its sender drops.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            fleet_threshold = self.config.fleet_threshold(),
            "Finalizer started"
        );

        while !*shutdown.borrow() {
            let popped = tokio::select! {
                popped = self.store.blocking_pop(FINALIZATION_QUEUE) => popped,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            };

            let raw = match popped {
                Ok(raw) => raw,
                Err(e) => {
                    error!(error = %e, "Failed to pop finalization queue");
                    tokio::time::sleep(POP_RETRY_DELAY).await;
                    continue;
                }
            };

            match self.process_entry(&raw).await {
                Ok(outcome) => debug!(?outcome, "Queue entry processed"),
                Err(FinalizerError::MalformedEntry(reason)) => {
                    metrics::record_entry_dropped("malformed");
                    warn!(%reason, "Dropping malformed queue entry");
                }
                Err(e) => {
                    metrics::record_entry_dropped(e.kind());
                    error!(error = %e, "Failed to process queue entry");
                }
            }
        }

        info!("Finalizer stopped");
    }

    /// Handle one popped entry.
    ///
    /// # Errors
    /// - `MalformedEntry` if `raw` is not a `FinalizedResult`
    /// - `Storage` if the settled marker or tally cannot be read or written
    pub async fn process_entry(&self, raw: &[u8]) -> FinalizerResult<ForwardOutcome> {
        let entry = FinalizedResult::decode(raw)
            .map_err(|e| FinalizerError::MalformedEntry(e.to_string()))?;
        let task_id = entry.task_id;

        if self.store.exists(&settled_key(task_id)).await? {
            debug!(task_id, "Ignoring forward for settled task");
            return Ok(ForwardOutcome::AlreadySettled);
        }

        let mut counted = false;
        let tally = update_json(
            self.store.as_ref(),
            &tally_key(task_id),
            Some(TASK_STATE_TTL),
            |current: Option<ForwardTally>| -> FinalizerResult<ForwardTally> {
                let mut tally = current.unwrap_or_default();
                counted = tally.record(&entry);
                Ok(tally)
            },
        )
        .await?;

        let count = tally.count(entry.result);
        if counted {
            metrics::record_forward_tallied(entry.result);
            self.events
                .publish(AggregatorEvent::ForwardTallied {
                    task_id,
                    result: entry.result,
                    count,
                })
                .await;
        } else {
            debug!(task_id, forwarder = ?entry.forwarder, "Forwarder already counted");
        }

        let threshold = self.config.fleet_threshold();
        if count < threshold {
            info!(task_id, result = entry.result, count, threshold, "Forward tallied");
            return Ok(ForwardOutcome::Tallied { count });
        }

        let slot = tally.get(entry.result).cloned().unwrap_or_default();
        self.settle(task_id, entry.result, slot).await
    }

    async fn settle(
        &self,
        task_id: TaskId,
        result: i64,
        slot: ResultTally,
    ) -> FinalizerResult<ForwardOutcome> {
        let claim = settling_key(task_id);
        let claimed = self
            .store
            .set_if_absent(&claim, result.to_string().into_bytes(), Some(self.config.claim_ttl()))
            .await?;
        if !claimed {
            debug!(task_id, "Settlement already in progress elsewhere");
            return Ok(ForwardOutcome::SettlementInProgress);
        }

        let joined = slot.joined_operators();

        match self.submit_bounded(task_id, result, &joined).await {
            Ok(()) => {
                self.store
                    .set(
                        &settled_key(task_id),
                        result.to_string().into_bytes(),
                        Some(TASK_STATE_TTL),
                    )
                    .await?;
                for key in [tally_key(task_id), verification_key(task_id), claim] {
                    if let Err(e) = self.store.delete(&key).await {
                        warn!(task_id, key = %key, error = %e, "Failed to clean up settled task state");
                    }
                }

                metrics::record_settlement_submitted(result);
                info!(task_id, result, operators = %joined, "Task settled");
                self.events
                    .publish(AggregatorEvent::TaskSettled {
                        task_id,
                        result,
                        operators: slot.operators,
                    })
                    .await;
                Ok(ForwardOutcome::Settled { result })
            }
            Err(e) => {
                if let Err(release) = self.store.delete(&claim).await {
                    error!(task_id, error = %release, "Failed to release settlement claim");
                }

                metrics::record_settlement_failed(e.kind());
                error!(task_id, result, error = %e, "Settlement failed, keeping tally");
                self.events
                    .publish(AggregatorEvent::SettlementFailed {
                        task_id,
                        result,
                        reason: e.to_string(),
                    })
                    .await;
                Ok(ForwardOutcome::SettlementFailed {
                    reason: e.to_string(),
                })
            }
        }
    }

    async fn submit_bounded(
        &self,
        task_id: TaskId,
        result: i64,
        operators: &str,
    ) -> Result<(), SettlementError> {
        let timeout = self.config.settlement_timeout();
        tokio::time::timeout(timeout, self.gateway.submit(task_id, result, operators))
            .await
            .unwrap_or(Err(SettlementError::TimedOut(timeout)))
    }
}
