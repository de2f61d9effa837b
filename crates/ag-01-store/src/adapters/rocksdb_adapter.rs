//! # RocksDB Store
//!
//! Durable `KeyValueStore` for single-node deployments that must survive a
//! restart without losing queued finalizations.
//!
//! ## Layout
//!
//! | Prefix | Content |
//! |--------|---------|
//! | `kv:{key}` | `[expires_at_ms: u64 BE][value]`, `0` = no expiry |
//! | `qh:{queue}` / `qt:{queue}` | Head / tail sequence numbers (u64 BE) |
//! | `q:{queue}:{seq:020}` | Queue entry |
//!
//! RocksDB has no native compare-and-swap, so every mutation runs under one
//! process-wide write lock. Reads go straight to the database.

use crate::domain::errors::{StoreError, StoreResult};
use crate::ports::outbound::KeyValueStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Notify;
use tracing::{debug, info};

const EXPIRY_HEADER_LEN: usize = 8;
const KV_PREFIX: &[u8] = b"kv:";

/// RocksDB configuration.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory.
    pub path: String,
    /// Write buffer size in bytes (default: 64MB).
    pub write_buffer_size: usize,
    /// Enable fsync after each write (default: true for durability).
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/aggregator".to_string(),
            write_buffer_size: 64 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Create config for testing (smaller buffers, no sync).
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            write_buffer_size: 4 * 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed implementation of [`KeyValueStore`].
pub struct RocksDbStore {
    db: DB,
    config: RocksDbConfig,
    write_lock: Mutex<()>,
    notifiers: Mutex<HashMap<String, Arc<Notify>>>,
}

impl RocksDbStore {
    /// Open or create a database at `config.path`.
    pub fn open(config: RocksDbConfig) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let db = DB::open(&opts, &config.path)
            .map_err(|e| StoreError::unavailable(format!("Failed to open RocksDB: {e}")))?;

        info!(path = %config.path, "Opened RocksDB store");

        Ok(Self {
            db,
            config,
            write_lock: Mutex::new(()),
            notifiers: Mutex::new(HashMap::new()),
        })
    }

    /// Database path.
    pub fn path(&self) -> &str {
        &self.config.path
    }

    fn notifier(&self, queue: &str) -> Arc<Notify> {
        self.notifiers
            .lock()
            .entry(queue.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    fn write_opts(&self) -> rocksdb::WriteOptions {
        let mut opts = rocksdb::WriteOptions::default();
        opts.set_sync(self.config.sync_writes);
        opts
    }

    fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn encode(value: &[u8], ttl: Option<Duration>) -> Vec<u8> {
        let expires_at = ttl.map_or(0, |ttl| Self::now_ms() + ttl.as_millis() as u64);
        let mut out = Vec::with_capacity(EXPIRY_HEADER_LEN + value.len());
        out.extend_from_slice(&expires_at.to_be_bytes());
        out.extend_from_slice(value);
        out
    }

    /// Live value stored under `key`, ignoring expired entries.
    fn read_live(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let Some(raw) = self
            .db
            .get(kv_key(key))
            .map_err(StoreError::unavailable)?
        else {
            return Ok(None);
        };

        if raw.len() < EXPIRY_HEADER_LEN {
            return Err(StoreError::Corrupted {
                key: key.to_string(),
            });
        }
        let (header, value) = raw.split_at(EXPIRY_HEADER_LEN);
        let expires_at = read_u64(header).ok_or_else(|| StoreError::Corrupted {
            key: key.to_string(),
        })?;

        if expires_at != 0 && expires_at <= Self::now_ms() {
            return Ok(None);
        }
        Ok(Some(value.to_vec()))
    }

    /// Keys under `kv:` whose expiry header has passed. Caller holds the
    /// write lock.
    fn expired_keys(&self) -> StoreResult<Vec<Box<[u8]>>> {
        let now = Self::now_ms();
        let mut expired = Vec::new();
        let iter = self
            .db
            .iterator(IteratorMode::From(KV_PREFIX, Direction::Forward));

        for item in iter {
            let (key, raw) = item.map_err(StoreError::unavailable)?;
            if !key.starts_with(KV_PREFIX) {
                break;
            }
            let expires_at = raw.get(..EXPIRY_HEADER_LEN).and_then(read_u64);
            if matches!(expires_at, Some(at) if at != 0 && at <= now) {
                expired.push(key);
            }
        }
        Ok(expired)
    }

    fn read_seq(&self, key: &str) -> StoreResult<u64> {
        match self.db.get(key).map_err(StoreError::unavailable)? {
            Some(raw) => read_u64(&raw).ok_or_else(|| StoreError::Corrupted {
                key: key.to_string(),
            }),
            None => Ok(0),
        }
    }

    fn put_live(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> StoreResult<()> {
        self.db
            .put_opt(kv_key(key), Self::encode(value, ttl), &self.write_opts())
            .map_err(StoreError::unavailable)
    }

    fn try_pop(&self, queue: &str) -> StoreResult<Option<Vec<u8>>> {
        let _guard = self.write_lock.lock();
        let head = self.read_seq(&head_key(queue))?;
        let tail = self.read_seq(&tail_key(queue))?;
        if head >= tail {
            return Ok(None);
        }

        let item_key = item_key(queue, head);
        let value = self
            .db
            .get(&item_key)
            .map_err(StoreError::unavailable)?
            .ok_or_else(|| StoreError::Corrupted {
                key: item_key.clone(),
            })?;

        let mut batch = WriteBatch::default();
        batch.delete(&item_key);
        batch.put(head_key(queue), (head + 1).to_be_bytes());
        self.db
            .write_opt(batch, &self.write_opts())
            .map_err(StoreError::unavailable)?;

        Ok(Some(value))
    }
}

fn kv_key(key: &str) -> String {
    format!("kv:{key}")
}

fn head_key(queue: &str) -> String {
    format!("qh:{queue}")
}

fn tail_key(queue: &str) -> String {
    format!("qt:{queue}")
}

fn item_key(queue: &str, seq: u64) -> String {
    format!("q:{queue}:{seq:020}")
}

fn read_u64(bytes: &[u8]) -> Option<u64> {
    Some(u64::from_be_bytes(bytes.try_into().ok()?))
}

#[async_trait]
impl KeyValueStore for RocksDbStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.read_live(key)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        self.put_live(key, &value, ttl)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.read_live(key)?.is_some())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        self.db
            .delete_opt(kv_key(key), &self.write_opts())
            .map_err(StoreError::unavailable)
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        let _guard = self.write_lock.lock();
        if self.read_live(key)?.is_some() {
            return Ok(false);
        }
        self.put_live(key, &value, ttl)?;
        Ok(true)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: Vec<u8>,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        let _guard = self.write_lock.lock();
        if self.read_live(key)?.as_deref() != expected {
            return Ok(false);
        }
        self.put_live(key, &new, ttl)?;
        Ok(true)
    }

    async fn push(&self, queue: &str, value: Vec<u8>) -> StoreResult<()> {
        {
            let _guard = self.write_lock.lock();
            let tail = self.read_seq(&tail_key(queue))?;

            let mut batch = WriteBatch::default();
            batch.put(item_key(queue, tail), &value);
            batch.put(tail_key(queue), (tail + 1).to_be_bytes());
            self.db
                .write_opt(batch, &self.write_opts())
                .map_err(StoreError::unavailable)?;
        }
        self.notifier(queue).notify_one();
        Ok(())
    }

    async fn blocking_pop(&self, queue: &str) -> StoreResult<Vec<u8>> {
        let notify = self.notifier(queue);
        loop {
            if let Some(value) = self.try_pop(queue)? {
                return Ok(value);
            }
            notify.notified().await;
        }
    }

    async fn queue_len(&self, queue: &str) -> StoreResult<usize> {
        let head = self.read_seq(&head_key(queue))?;
        let tail = self.read_seq(&tail_key(queue))?;
        Ok(tail.saturating_sub(head) as usize)
    }

    async fn purge_expired(&self) -> StoreResult<usize> {
        let _guard = self.write_lock.lock();
        let expired = self.expired_keys()?;
        if expired.is_empty() {
            return Ok(0);
        }

        let mut batch = WriteBatch::default();
        for key in &expired {
            batch.delete(key);
        }
        self.db
            .write_opt(batch, &self.write_opts())
            .map_err(StoreError::unavailable)?;
        debug!(removed = expired.len(), "Purged expired keys");
        Ok(expired.len())
    }
}
