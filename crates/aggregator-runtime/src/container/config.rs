//! # Aggregator Configuration
//!
//! Every runtime parameter, loaded once from the environment and validated
//! before anything is wired.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `AGG_HTTP_ADDR` | `0.0.0.0:8080` |
//! | `AGG_DOMAIN_HASH` | required |
//! | `AGG_QUORUM` | `3` |
//! | `AGG_THRESHOLD_PCT` | `67` |
//! | `AGG_FLEET_THRESHOLD` | `1` |
//! | `AGG_FRESHNESS_WINDOW_SECS` | `120` |
//! | `AGG_SETTLEMENT_URL` | unset (finalizer disabled) |
//! | `AGG_SETTLEMENT_TIMEOUT_SECS` | `30` |
//! | `AGG_OPERATORS` | required, comma-separated |
//! | `AGG_STORE` | `memory` (`rocksdb` with the `rocksdb` feature) |
//! | `AGG_DATA_DIR` | `./data` |
//! | `AGG_INSTANCE_ID` | random `agg-<uuid>` |
//! | `AGG_PURGE_INTERVAL_SECS` | `300` |
//!
//! Instances sharing one store forward each task once between them, because
//! the finished marker is shared. A fleet threshold above 1 is only reached
//! when instances run on separate stores and their queue entries are relayed
//! into the finalizer's store; the binary does no relaying itself.

use ag_02_vote_validation::{ValidatorConfig, DEFAULT_FRESHNESS_WINDOW_SECS};
use ag_03_task_verification::{ConsensusConfig, DEFAULT_QUORUM, DEFAULT_THRESHOLD_PCT};
use ag_04_finalizer::{FinalizerConfig, DEFAULT_FLEET_THRESHOLD, DEFAULT_SETTLEMENT_TIMEOUT};
use shared_types::ConfigError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default interval between expired-key sweeps.
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Shared store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    RocksDb,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "rocksdb" => Ok(Self::RocksDb),
            other => Err(ConfigError::invalid(
                "AGG_STORE",
                format!("unknown backend {other:?}, expected memory or rocksdb"),
            )),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    pub http_addr: SocketAddr,
    /// Domain hash bound into every signed vote.
    pub domain_hash: String,
    pub quorum: usize,
    pub threshold_pct: u8,
    pub fleet_threshold: usize,
    pub freshness_window_secs: i64,
    /// Ledger client endpoint. Without it this instance only forwards.
    pub settlement_url: Option<String>,
    pub settlement_timeout: Duration,
    /// Registered operator identities.
    pub operators: Vec<String>,
    pub store: StoreBackend,
    pub data_dir: PathBuf,
    /// Identifies this instance's forwards to the fleet finalizer.
    pub instance_id: String,
    pub purge_interval: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            domain_hash: String::new(),
            quorum: DEFAULT_QUORUM,
            threshold_pct: DEFAULT_THRESHOLD_PCT,
            fleet_threshold: DEFAULT_FLEET_THRESHOLD,
            freshness_window_secs: DEFAULT_FRESHNESS_WINDOW_SECS,
            settlement_url: None,
            settlement_timeout: DEFAULT_SETTLEMENT_TIMEOUT,
            operators: Vec::new(),
            store: StoreBackend::Memory,
            data_dir: PathBuf::from("./data"),
            instance_id: format!("agg-{}", uuid::Uuid::new_v4()),
            purge_interval: DEFAULT_PURGE_INTERVAL,
        }
    }
}

impl AggregatorConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("AGG_HTTP_ADDR") {
            config.http_addr = parse("AGG_HTTP_ADDR", &v)?;
        }
        if let Some(v) = get("AGG_DOMAIN_HASH") {
            config.domain_hash = v.trim().to_string();
        }
        if let Some(v) = get("AGG_QUORUM") {
            config.quorum = parse("AGG_QUORUM", &v)?;
        }
        if let Some(v) = get("AGG_THRESHOLD_PCT") {
            config.threshold_pct = parse("AGG_THRESHOLD_PCT", &v)?;
        }
        if let Some(v) = get("AGG_FLEET_THRESHOLD") {
            config.fleet_threshold = parse("AGG_FLEET_THRESHOLD", &v)?;
        }
        if let Some(v) = get("AGG_FRESHNESS_WINDOW_SECS") {
            config.freshness_window_secs = parse("AGG_FRESHNESS_WINDOW_SECS", &v)?;
        }
        config.settlement_url = get("AGG_SETTLEMENT_URL").map(|v| v.trim().to_string());
        if let Some(v) = get("AGG_SETTLEMENT_TIMEOUT_SECS") {
            config.settlement_timeout =
                Duration::from_secs(parse("AGG_SETTLEMENT_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("AGG_OPERATORS") {
            config.operators = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = get("AGG_STORE") {
            config.store = v.trim().parse()?;
        }
        if let Some(v) = get("AGG_DATA_DIR") {
            config.data_dir = PathBuf::from(v);
        }
        if let Some(v) = get("AGG_INSTANCE_ID") {
            config.instance_id = v.trim().to_string();
        }
        if let Some(v) = get("AGG_PURGE_INTERVAL_SECS") {
            config.purge_interval = Duration::from_secs(parse("AGG_PURGE_INTERVAL_SECS", &v)?);
        }

        Ok(config)
    }

    /// Reject configurations the components cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain_hash.is_empty() {
            return Err(ConfigError::Missing("AGG_DOMAIN_HASH"));
        }
        if self.operators.is_empty() {
            return Err(ConfigError::Missing("AGG_OPERATORS"));
        }
        if self.freshness_window_secs <= 0 {
            return Err(ConfigError::invalid(
                "AGG_FRESHNESS_WINDOW_SECS",
                "must be positive",
            ));
        }
        if self.purge_interval.is_zero() {
            return Err(ConfigError::invalid("AGG_PURGE_INTERVAL_SECS", "must be positive"));
        }
        if self.store == StoreBackend::RocksDb && !cfg!(feature = "rocksdb") {
            return Err(ConfigError::invalid(
                "AGG_STORE",
                "binary built without the rocksdb feature",
            ));
        }
        self.consensus()?;
        self.finalizer()?;
        Ok(())
    }

    /// The fleet threshold needs forwards from more than one store.
    pub fn needs_fleet_relay(&self) -> bool {
        self.fleet_threshold > 1
    }

    pub fn consensus(&self) -> Result<ConsensusConfig, ConfigError> {
        ConsensusConfig::new(self.quorum, self.threshold_pct)
    }

    pub fn finalizer(&self) -> Result<FinalizerConfig, ConfigError> {
        FinalizerConfig::new(self.fleet_threshold, self.settlement_timeout)
    }

    pub fn validator(&self) -> ValidatorConfig {
        ValidatorConfig::new(self.domain_hash.clone())
            .with_freshness_window(self.freshness_window_secs)
    }
}

fn parse<T>(field: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(field, format!("{value:?}: {e}")))
}
