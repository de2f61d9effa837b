//! # Ports Layer
//!
//! Outbound dependencies (store, validator, event bus) are the traits of the
//! crates that own them; only the inbound API is defined here.

pub mod inbound;
