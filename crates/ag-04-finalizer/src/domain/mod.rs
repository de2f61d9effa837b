//! # Domain Layer
//!
//! Forward tally aggregate and finalizer configuration.

pub mod config;
pub mod tally;

pub use config::{
    FinalizerConfig, DEFAULT_FLEET_THRESHOLD, DEFAULT_SETTLEMENT_TIMEOUT, SETTLEMENT_CLAIM_MARGIN,
};
pub use tally::{ForwardTally, ResultTally, OPERATOR_SEPARATOR};
