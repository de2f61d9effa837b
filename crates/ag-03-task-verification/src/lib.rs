//! # Task Verification (ag-03)
//!
//! Collects accepted votes per task, decides locally when enough attesters
//! agree, and hands each decided task to the settlement tier exactly once.
//!
//! ```text
//! VoteRequest ──→ VoteValidator ──→ record_vote (CAS) ──→ evaluate
//!                                                            │
//!                                              Pending ←─────┤
//!                                                            ↓ Approved / Rejected
//!                                                  FinalizationGate
//!                                        set_if_absent(finished:{id}) ──→ push(task_queue)
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Mechanism |
//! |-----------|-----------|
//! | At most one performer per task | Duplicate check inside the CAS update |
//! | At most one vote per attester address | Duplicate check inside the CAS update |
//! | At most one queue push per task | Test-and-set on the finished marker |
//! | No decision can be both approved and rejected | `threshold_pct > 50` enforced by `ConsensusConfig::new` |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Record aggregate, consensus evaluation, errors
//! - `ports/` - `AggregatorApi` inbound port
//! - `gate` - Finalization gate
//! - `service/` - Application service implementing the API

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod domain;
pub mod gate;
pub mod metrics;
pub mod ports;
pub mod service;

pub use domain::consensus::{
    evaluate, rounded_pct, ConsensusConfig, ConsensusOutcome, DEFAULT_QUORUM,
    DEFAULT_THRESHOLD_PCT,
};
pub use domain::errors::{AggregatorError, AggregatorResult};
pub use domain::record::TaskVerificationRecord;
pub use gate::FinalizationGate;
pub use ports::inbound::{AggregatorApi, PerformerView, SubmissionOutcome};
pub use service::{AggregatorDependencies, AggregatorService};
