//! Adapters implementing the `KeyValueStore` port.

pub mod memory;

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;
