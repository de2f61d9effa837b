//! Domain layer for the store adapter.

pub mod errors;
