//! # Redundant-Forward Finalizer (ag-04)
//!
//! A single local decision is not enough to write to the ledger. Every
//! aggregator instance pushes its decided tasks onto the shared finalization
//! queue; this crate pops them, counts independent forwards per task and
//! result value, and calls the settlement gateway only once
//! `fleet_threshold` instances agree.
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | No lost forwards between finalizer instances | `update_json` CAS on `tally:{taskId}` |
//! | A retried forward is not counted twice | Forwarder set per result value |
//! | One settlement in flight per task | `set_if_absent(settling:{taskId})` |
//! | Late forwards after settlement are ignored | `settled:{taskId}` marker |
//!
//! A failed or timed-out settlement releases the claim and keeps the tally;
//! the next forward for the task re-runs the threshold check. The finalizer
//! never retries the call on its own.
//!
//! ## Crate Structure
//!
//! - `domain/` - Forward tally, configuration
//! - `ports/` - `SettlementGateway`
//! - `adapters/` - In-memory gateway
//! - `service` - The consumption loop

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{MockSettlementGateway, SettlementCall};
pub use domain::{
    FinalizerConfig, ForwardTally, ResultTally, DEFAULT_FLEET_THRESHOLD,
    DEFAULT_SETTLEMENT_TIMEOUT, OPERATOR_SEPARATOR,
};
pub use error::{FinalizerError, FinalizerResult, SettlementError};
pub use ports::SettlementGateway;
pub use service::{Finalizer, FinalizerDependencies, ForwardOutcome};
