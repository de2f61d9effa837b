//! # Task Aggregator Runtime
//!
//! Wires the aggregator components into a process and serves them over HTTP.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and component wiring
//! - `adapters/` - Settlement client
//! - `handlers/` - HTTP routes
//! - `audit` - Audit log fed from the event bus
//! - `sweeper` - Periodic purge of expired store keys
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load and validate configuration from the environment
//! 3. Open the store and wire components
//! 4. Spawn the audit log, the store sweeper and, when a settlement endpoint is configured, the
//!    finalizer loop
//! 5. Serve HTTP until Ctrl-C

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod audit;
pub mod container;
pub mod handlers;
pub mod sweeper;

pub use adapters::HttpSettlementGateway;
pub use audit::{audit_filter, run_audit_log};
pub use container::{AggregatorConfig, AggregatorContainer, StoreBackend};
pub use handlers::{create_router, AppState};
pub use sweeper::run_store_sweeper;
