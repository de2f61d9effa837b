//! # Ports Layer
//!
//! The finalizer is driven by the queue, not by callers, so it has no inbound
//! API beyond `Finalizer::run`. Its only outbound dependency besides the store
//! is the ledger.

pub mod outbound;

pub use outbound::SettlementGateway;
