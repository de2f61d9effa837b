//! # Adapters
//!
//! The HTTP gateway lives in the runtime crate next to its client stack; only
//! the in-memory gateway used by tests is defined here.

pub mod mock_settlement;

pub use mock_settlement::{MockSettlementGateway, SettlementCall};
