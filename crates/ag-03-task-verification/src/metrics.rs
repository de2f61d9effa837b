//! # Vote Path Metrics
//!
//! Prometheus metrics for vote admission and local finalization.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! ag-03-task-verification = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `aggregator_votes_accepted_total` - Accepted votes (by role)
//! - `aggregator_votes_rejected_total` - Rejected votes (by error kind)
//! - `aggregator_tasks_finalized_total` - Tasks handed to the queue (by outcome)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter_vec, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Accepted votes, labeled by role
    pub static ref VOTES_ACCEPTED: IntCounterVec = register_int_counter_vec!(
        "aggregator_votes_accepted_total",
        "Total number of votes recorded",
        &["role"]
    )
    .expect("Failed to create VOTES_ACCEPTED metric");

    /// Rejected votes, labeled by error kind
    pub static ref VOTES_REJECTED: IntCounterVec = register_int_counter_vec!(
        "aggregator_votes_rejected_total",
        "Total number of votes rejected",
        &["kind"]
    )
    .expect("Failed to create VOTES_REJECTED metric");

    /// Finalized tasks, labeled by outcome
    pub static ref TASKS_FINALIZED: IntCounterVec = register_int_counter_vec!(
        "aggregator_tasks_finalized_total",
        "Total number of tasks pushed to the finalization queue",
        &["outcome"]
    )
    .expect("Failed to create TASKS_FINALIZED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

#[cfg(feature = "metrics")]
pub fn record_vote_accepted(role: &str) {
    VOTES_ACCEPTED.with_label_values(&[role]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_vote_rejected(kind: &str) {
    VOTES_REJECTED.with_label_values(&[kind]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_task_finalized(outcome: &str) {
    TASKS_FINALIZED.with_label_values(&[outcome]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_vote_accepted(_role: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_vote_rejected(_kind: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_task_finalized(_outcome: &str) {}
