//! # Test Fixtures
//!
//! Operators that sign real secp256k1 votes, and a harness wiring the vote
//! path and the finalizer over one in-memory store.

use ag_01_store::{InMemoryStore, KeyValueStore};
use ag_02_vote_validation::{
    address_from_pubkey, canonical_message, FixedTimeSource, Secp256k1Identity,
    StaticOperatorRegistry, ValidatorConfig, VoteRequest, VoteValidator,
};
use ag_03_task_verification::{AggregatorDependencies, AggregatorService, ConsensusConfig};
use ag_04_finalizer::{
    Finalizer, FinalizerConfig, FinalizerDependencies, ForwardOutcome, MockSettlementGateway,
};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{Signature, SigningKey};
use sha2::{Digest, Sha256};
use shared_bus::InMemoryEventBus;
use shared_types::{OperatorAddress, TaskId, FINALIZATION_QUEUE};
use std::sync::Arc;
use std::time::Duration;

pub const DOMAIN_HASH: &str = "0xbvs-domain";
pub const NOW: i64 = 1_700_000_000;

/// A registered operator holding its signing key.
pub struct Operator {
    key: SigningKey,
    pub public_key: String,
    pub address: OperatorAddress,
}

impl Operator {
    pub fn random() -> Self {
        let key = SigningKey::random(&mut rand::thread_rng());
        let public_key = hex::encode(key.verifying_key().to_encoded_point(true).as_bytes());
        let address = address_from_pubkey(key.verifying_key());
        Self {
            key,
            public_key,
            address,
        }
    }

    /// Sign `result` for `task_id` at `timestamp`.
    pub fn vote_at(&self, task_id: TaskId, result: &str, role: &str, timestamp: i64) -> VoteRequest {
        let message = canonical_message(DOMAIN_HASH, timestamp, task_id, result);
        let signature: Signature = self
            .key
            .sign_prehash(&Sha256::digest(message.as_bytes()))
            .expect("prehash signing");
        VoteRequest {
            task_id,
            result: result.to_string(),
            timestamp,
            signature: hex::encode(signature.to_bytes()),
            pub_key: self.public_key.clone(),
            role: role.to_string(),
        }
    }

    pub fn perform(&self, task_id: TaskId, result: &str) -> VoteRequest {
        self.vote_at(task_id, result, "performer", NOW)
    }

    pub fn attest(&self, task_id: TaskId, approve: bool) -> VoteRequest {
        self.vote_at(task_id, if approve { "true" } else { "false" }, "attester", NOW)
    }
}

/// One aggregator instance's components over a shared store.
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<FixedTimeSource>,
    pub events: Arc<InMemoryEventBus>,
    pub gateway: Arc<MockSettlementGateway>,
    pub operators: Vec<Operator>,
    pub service: Arc<AggregatorService>,
    pub finalizer: Arc<Finalizer>,
}

impl Harness {
    /// Harness with `operators` registered, default consensus and fleet threshold 1.
    pub fn new(operators: usize) -> Self {
        Self::with_config(operators, "agg-1", ConsensusConfig::default(), FinalizerConfig::default())
    }

    pub fn with_config(
        operators: usize,
        instance_id: &str,
        consensus: ConsensusConfig,
        finalizer: FinalizerConfig,
    ) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(FixedTimeSource::new(NOW));
        let events = Arc::new(InMemoryEventBus::new());
        let gateway = Arc::new(MockSettlementGateway::new());
        let operators: Vec<Operator> = (0..operators).map(|_| Operator::random()).collect();
        let identity = Arc::new(Secp256k1Identity::new());

        let validator = Arc::new(VoteValidator::new(
            ValidatorConfig::new(DOMAIN_HASH),
            store.clone(),
            identity.clone(),
            identity,
            Arc::new(StaticOperatorRegistry::new(
                operators.iter().map(|op| op.address.as_str().to_string()),
            )),
            clock.clone(),
        ));

        let service = Arc::new(AggregatorService::new(AggregatorDependencies {
            validator,
            store: store.clone(),
            events: events.clone(),
            consensus,
            instance_id: instance_id.to_string(),
        }));

        let finalizer = Arc::new(Finalizer::new(FinalizerDependencies {
            store: store.clone(),
            gateway: gateway.clone(),
            events: events.clone(),
            config: finalizer,
        }));

        Self {
            store,
            clock,
            events,
            gateway,
            operators,
            service,
            finalizer,
        }
    }

    pub fn operator(&self, index: usize) -> &Operator {
        &self.operators[index]
    }

    pub async fn queue_len(&self) -> usize {
        self.store
            .queue_len(FINALIZATION_QUEUE)
            .await
            .expect("queue length")
    }

    /// Pop and process every queued entry.
    pub async fn drain(&self) -> Vec<ForwardOutcome> {
        let mut outcomes = Vec::new();
        while self.queue_len().await > 0 {
            let raw = self
                .store
                .blocking_pop(FINALIZATION_QUEUE)
                .await
                .expect("pop");
            outcomes.push(self.finalizer.process_entry(&raw).await.expect("process"));
        }
        outcomes
    }
}

/// Consensus config with an explicit quorum and threshold.
pub fn consensus(quorum: usize, threshold_pct: u8) -> ConsensusConfig {
    ConsensusConfig::new(quorum, threshold_pct).expect("valid consensus config")
}

pub fn fleet(threshold: usize) -> FinalizerConfig {
    FinalizerConfig::new(threshold, Duration::from_secs(5)).expect("valid finalizer config")
}
