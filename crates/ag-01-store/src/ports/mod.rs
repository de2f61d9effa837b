//! Ports for the store adapter.

pub mod outbound;
