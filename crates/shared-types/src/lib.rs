//! # Shared Types Crate
//!
//! Domain entities and the persisted key layout used by every aggregator
//! component.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every type that is written to the store or
//!   crosses a crate boundary is defined here.
//! - **Disjoint Key Space**: All per-task state lives under keys derived from
//!   the task id, so contention never spans unrelated tasks.
//! - **Immutable Submissions**: A `TaskSubmission` is never mutated after it
//!   has been accepted into a verification record.

pub mod entities;
pub mod errors;
pub mod keys;

pub use entities::*;
pub use errors::*;
pub use keys::*;
