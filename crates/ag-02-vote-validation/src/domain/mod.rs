//! # Domain Layer
//!
//! Vote admission rules with no I/O dependencies.

pub mod entities;
pub mod errors;
pub mod rules;
