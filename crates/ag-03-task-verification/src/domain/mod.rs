//! # Domain Layer
//!
//! The per-task record aggregate and the pure consensus function.

pub mod consensus;
pub mod errors;
pub mod record;
