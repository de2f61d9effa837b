//! # Component Container
//!
//! Holds the wired components of one aggregator instance.
//!
//! ## Wiring Order
//!
//! ```text
//! Store ──┬──→ VoteValidator ──→ AggregatorService ──→ HTTP handlers
//!         │                            │
//!         │                            └── push ──→ task_queue
//!         │                                            │
//!         └──────────────────────────→ Finalizer ←── pop
//!                                          │
//!                                          └──→ SettlementGateway
//! ```
//!
//! The finalizer is optional: an instance without a settlement endpoint only
//! forwards, and another instance of the fleet settles.

pub mod config;

pub use config::{AggregatorConfig, StoreBackend};

use crate::adapters::HttpSettlementGateway;
use crate::handlers::AppState;
use ag_01_store::{InMemoryStore, KeyValueStore};
use ag_02_vote_validation::{
    Secp256k1Identity, StaticOperatorRegistry, SystemTimeSource, VoteValidator,
};
use ag_03_task_verification::{AggregatorDependencies, AggregatorService};
use ag_04_finalizer::{Finalizer, FinalizerDependencies, SettlementGateway};
use anyhow::Context;
use shared_bus::InMemoryEventBus;
use shared_types::ConfigError;
use std::sync::Arc;
use tracing::{info, warn};

/// Central container holding the instance's components.
pub struct AggregatorContainer {
    pub config: AggregatorConfig,
    pub store: Arc<dyn KeyValueStore>,
    pub events: Arc<InMemoryEventBus>,
    pub service: Arc<AggregatorService>,
    /// Present when a settlement endpoint is configured.
    pub finalizer: Option<Arc<Finalizer>>,
}

impl AggregatorContainer {
    /// Open the configured store and settlement client, then wire everything.
    pub fn build(config: AggregatorConfig) -> anyhow::Result<Self> {
        let store = open_store(&config)?;

        let gateway: Option<Arc<dyn SettlementGateway>> = match &config.settlement_url {
            Some(url) => {
                let gateway = HttpSettlementGateway::new(url.clone(), config.settlement_timeout)
                    .context("Failed to build settlement client")?;
                Some(Arc::new(gateway))
            }
            None => {
                warn!("AGG_SETTLEMENT_URL not set; finalizer disabled, forwarding only");
                None
            }
        };

        Ok(Self::assemble(config, store, gateway)?)
    }

    /// Wire components over an already opened store and gateway.
    pub fn assemble(
        config: AggregatorConfig,
        store: Arc<dyn KeyValueStore>,
        gateway: Option<Arc<dyn SettlementGateway>>,
    ) -> Result<Self, ConfigError> {
        let events = Arc::new(InMemoryEventBus::new());
        let identity = Arc::new(Secp256k1Identity::new());

        let validator = Arc::new(VoteValidator::new(
            config.validator(),
            store.clone(),
            identity.clone(),
            identity,
            Arc::new(StaticOperatorRegistry::new(config.operators.iter().cloned())),
            Arc::new(SystemTimeSource),
        ));

        let service = Arc::new(AggregatorService::new(AggregatorDependencies {
            validator,
            store: store.clone(),
            events: events.clone(),
            consensus: config.consensus()?,
            instance_id: config.instance_id.clone(),
        }));

        let finalizer = match gateway {
            Some(gateway) => Some(Arc::new(Finalizer::new(FinalizerDependencies {
                store: store.clone(),
                gateway,
                events: events.clone(),
                config: config.finalizer()?,
            }))),
            None => None,
        };

        if finalizer.is_some() && config.needs_fleet_relay() {
            warn!(
                fleet_threshold = config.fleet_threshold,
                "Instances sharing this store forward each task once; the fleet threshold is \
                 only reachable with forwards relayed from separate stores"
            );
        }

        info!(
            instance_id = %config.instance_id,
            operators = config.operators.len(),
            quorum = config.quorum,
            threshold_pct = config.threshold_pct,
            finalizer = finalizer.is_some(),
            "Aggregator components wired"
        );

        Ok(Self {
            config,
            store,
            events,
            service,
            finalizer,
        })
    }

    /// Handler state for the HTTP router.
    pub fn app_state(&self) -> AppState {
        AppState {
            api: self.service.clone(),
        }
    }
}

fn open_store(config: &AggregatorConfig) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match config.store {
        StoreBackend::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        #[cfg(feature = "rocksdb")]
        StoreBackend::RocksDb => {
            let path = config.data_dir.join("aggregator");
            info!(path = %path.display(), "Opening RocksDB store");
            let store = ag_01_store::RocksDbStore::open(ag_01_store::RocksDbConfig {
                path: path.to_string_lossy().into_owned(),
                ..Default::default()
            })
            .context("Failed to open RocksDB store")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "rocksdb"))]
        StoreBackend::RocksDb => {
            anyhow::bail!("binary built without the rocksdb feature")
        }
    }
}
