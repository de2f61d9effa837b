//! # Store Adapter (ag-01)
//!
//! The only shared mutable resource in the aggregator. Every other component
//! coordinates exclusively through the primitives defined here, so several
//! aggregator processes can share one store.
//!
//! ## Primitives
//!
//! | Operation | Semantics |
//! |-----------|-----------|
//! | `get` / `set` | Value with optional TTL; expired entries read as absent |
//! | `set_if_absent` | Atomic claim; exactly one caller observes `true` |
//! | `compare_and_swap` | Atomic per-key replace guarded by the expected value |
//! | `push` / `blocking_pop` | Durable FIFO; pop suspends while the queue is empty |
//!
//! [`update_json`] builds an optimistic read-modify-write on top of
//! `compare_and_swap`. Per-task records and tallies are updated through it, so
//! concurrent writers for the same key never lose an update and unrelated keys
//! never serialize against each other.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Error taxonomy
//! - `ports/` - The `KeyValueStore` outbound port
//! - `adapters/` - In-memory and RocksDB implementations
//! - `update` - Atomic JSON update helper

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod update;

pub use adapters::memory::InMemoryStore;
#[cfg(feature = "rocksdb")]
pub use adapters::rocksdb_adapter::{RocksDbConfig, RocksDbStore};
pub use domain::errors::{StoreError, StoreResult};
pub use ports::outbound::KeyValueStore;
pub use update::{update_json, update_json_guarded, MAX_CAS_RETRIES};
