//! # Runtime Adapters
//!
//! Port implementations that need the runtime's client stack.

pub mod settlement;

pub use settlement::HttpSettlementGateway;
