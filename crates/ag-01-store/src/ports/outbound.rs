//! # Outbound Ports (Driven Ports)
//!
//! The key-value interface every aggregator component is written against.
//!
//! Production: `RocksDbStore` (feature `rocksdb`) or any shared store offering
//! the same atomic primitives.
//! Testing: `InMemoryStore`.

use crate::domain::errors::StoreResult;
use async_trait::async_trait;
use std::time::Duration;

/// Abstract interface for the shared key-value store.
///
/// All operations are atomic per key. Expired entries behave exactly as if
/// they were absent, including for `set_if_absent` and `compare_and_swap`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Set a value, replacing any previous one. `ttl = None` never expires.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> StoreResult<()>;

    /// Check if a key exists.
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Create the key only if it is absent.
    ///
    /// Returns `true` if this call created the key.
    async fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> StoreResult<bool>;

    /// Replace the value only if the current one equals `expected`.
    ///
    /// `expected = None` requires the key to be absent. Returns `true` if the
    /// swap was applied.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: Vec<u8>,
        ttl: Option<Duration>,
    ) -> StoreResult<bool>;

    /// Append to the tail of a FIFO queue.
    async fn push(&self, queue: &str, value: Vec<u8>) -> StoreResult<()>;

    /// Remove and return the head of a FIFO queue.
    ///
    /// Suspends while the queue is empty; returns immediately otherwise.
    async fn blocking_pop(&self, queue: &str) -> StoreResult<Vec<u8>>;

    /// Number of entries waiting in a queue.
    async fn queue_len(&self, queue: &str) -> StoreResult<usize>;

    /// Remove every expired key; returns how many were removed.
    ///
    /// Stores that evict expired keys on their own keep the default.
    async fn purge_expired(&self) -> StoreResult<usize> {
        Ok(0)
    }
}
