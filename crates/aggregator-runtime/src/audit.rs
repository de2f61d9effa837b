//! Audit log of task decisions and settlements.
//!
//! Subscribes to the finalization and settlement topics and writes one
//! `audit` target line per event. Votes are left to the debug logs.

use shared_bus::{AggregatorEvent, EventFilter, EventTopic, Subscription};
use tokio::sync::watch;
use tracing::{info, warn};

/// Topics the audit log records.
pub fn audit_filter() -> EventFilter {
    EventFilter::topics(vec![EventTopic::Finalization, EventTopic::Settlement])
}

/// Log events until `shutdown` flips, its sender drops, or the bus closes.
pub async fn run_audit_log(mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
    while !*shutdown.borrow() {
        tokio::select! {
            event = subscription.recv() => match event {
                Some(event) => log_event(&event),
                None => break,
            },
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    if subscription.missed() > 0 {
        warn!(target: "audit", missed = subscription.missed(), "Audit log skipped events");
    }
}

fn log_event(event: &AggregatorEvent) {
    match event {
        AggregatorEvent::TaskFinalized {
            task_id,
            performer,
            result,
        } => info!(target: "audit", task_id, performer = %performer, result, "Task finalized"),
        AggregatorEvent::ForwardTallied {
            task_id,
            result,
            count,
        } => info!(target: "audit", task_id, result, count, "Forward tallied"),
        AggregatorEvent::TaskSettled {
            task_id,
            result,
            operators,
        } => info!(
            target: "audit",
            task_id,
            result,
            operators = operators.len(),
            "Task settled"
        ),
        AggregatorEvent::SettlementFailed {
            task_id,
            result,
            reason,
        } => warn!(target: "audit", task_id, result, reason = %reason, "Settlement failed"),
        AggregatorEvent::VoteAccepted { .. } => {}
    }
}
