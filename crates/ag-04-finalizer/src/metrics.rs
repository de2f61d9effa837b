//! # Finalizer Metrics
//!
//! Enable with the `metrics` feature.
//!
//! ## Metrics Exported
//!
//! - `aggregator_forwards_tallied_total` - Forwards counted (by result)
//! - `aggregator_settlements_submitted_total` - Successful settlement calls (by result)
//! - `aggregator_settlements_failed_total` - Failed settlement calls (by reason)
//! - `aggregator_finalizer_entries_dropped_total` - Queue entries discarded (by reason)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter_vec, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref FORWARDS_TALLIED: IntCounterVec = register_int_counter_vec!(
        "aggregator_forwards_tallied_total",
        "Total number of forwards added to a tally",
        &["result"]
    )
    .expect("Failed to create FORWARDS_TALLIED metric");

    pub static ref SETTLEMENTS_SUBMITTED: IntCounterVec = register_int_counter_vec!(
        "aggregator_settlements_submitted_total",
        "Total number of successful settlement calls",
        &["result"]
    )
    .expect("Failed to create SETTLEMENTS_SUBMITTED metric");

    pub static ref SETTLEMENTS_FAILED: IntCounterVec = register_int_counter_vec!(
        "aggregator_settlements_failed_total",
        "Total number of failed settlement calls",
        &["reason"]
    )
    .expect("Failed to create SETTLEMENTS_FAILED metric");

    pub static ref ENTRIES_DROPPED: IntCounterVec = register_int_counter_vec!(
        "aggregator_finalizer_entries_dropped_total",
        "Total number of queue entries discarded by the finalizer",
        &["reason"]
    )
    .expect("Failed to create ENTRIES_DROPPED metric");
}

#[cfg(feature = "metrics")]
pub fn record_forward_tallied(result: i64) {
    FORWARDS_TALLIED
        .with_label_values(&[&result.to_string()])
        .inc();
}

#[cfg(feature = "metrics")]
pub fn record_settlement_submitted(result: i64) {
    SETTLEMENTS_SUBMITTED
        .with_label_values(&[&result.to_string()])
        .inc();
}

#[cfg(feature = "metrics")]
pub fn record_settlement_failed(reason: &str) {
    SETTLEMENTS_FAILED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_entry_dropped(reason: &str) {
    ENTRIES_DROPPED.with_label_values(&[reason]).inc();
}

// No-op implementations when metrics are disabled

#[cfg(not(feature = "metrics"))]
pub fn record_forward_tallied(_result: i64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_settlement_submitted(_result: i64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_settlement_failed(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_entry_dropped(_reason: &str) {}
