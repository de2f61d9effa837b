//! # In-Memory Store
//!
//! Process-local `KeyValueStore` for single-instance deployments and tests.
//!
//! Expiry uses `tokio::time::Instant`, so tests running on a paused clock can
//! advance past a TTL deterministically. Each queue owns a `Notify`; `push`
//! stores a permit when no consumer is waiting, so a pop that races a push
//! never misses it.

use crate::domain::errors::StoreResult;
use crate::ports::outbound::KeyValueStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::trace;

struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    queues: HashMap<String, VecDeque<Vec<u8>>>,
}

impl Inner {
    /// Live entry for `key`, evicting it first if it has expired.
    fn live(&mut self, key: &str) -> Option<&Entry> {
        let now = Instant::now();
        if self.entries.get(key).is_some_and(|e| !e.is_live(now)) {
            self.entries.remove(key);
            trace!(key, "Evicted expired entry");
        }
        self.entries.get(key)
    }
}

/// In-memory implementation of [`KeyValueStore`].
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
    notifiers: Mutex<HashMap<String, Arc<Notify>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn notifier(&self, queue: &str) -> Arc<Notify> {
        self.notifiers
            .lock()
            .entry(queue.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    /// Keys held, expired or not.
    pub fn key_count(&self) -> usize {
        self.inner.lock().entries.len()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.inner.lock().live(key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> StoreResult<()> {
        self.inner
            .lock()
            .entries
            .insert(key.to_string(), Entry::new(value, ttl));
        Ok(())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.inner.lock().live(key).is_some())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.lock().entries.remove(key);
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.lock();
        if inner.live(key).is_some() {
            return Ok(false);
        }
        inner
            .entries
            .insert(key.to_string(), Entry::new(value, ttl));
        Ok(true)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: Vec<u8>,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.lock();
        let current = inner.live(key).map(|e| e.value.as_slice());
        if current != expected {
            return Ok(false);
        }
        inner.entries.insert(key.to_string(), Entry::new(new, ttl));
        Ok(true)
    }

    async fn push(&self, queue: &str, value: Vec<u8>) -> StoreResult<()> {
        self.inner
            .lock()
            .queues
            .entry(queue.to_string())
            .or_default()
            .push_back(value);
        self.notifier(queue).notify_one();
        Ok(())
    }

    async fn blocking_pop(&self, queue: &str) -> StoreResult<Vec<u8>> {
        let notify = self.notifier(queue);
        loop {
            let head = self
                .inner
                .lock()
                .queues
                .get_mut(queue)
                .and_then(VecDeque::pop_front);
            if let Some(value) = head {
                return Ok(value);
            }
            notify.notified().await;
        }
    }

    async fn queue_len(&self, queue: &str) -> StoreResult<usize> {
        Ok(self.inner.lock().queues.get(queue).map_or(0, VecDeque::len))
    }

    async fn purge_expired(&self) -> StoreResult<usize> {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| entry.is_live(now));
        Ok(before - inner.entries.len())
    }
}
