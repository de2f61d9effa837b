//! # Vote Validation Service
//!
//! Application service implementing `VoteValidationApi`. Pure checks are
//! delegated to `domain::rules`; key handling, the finished marker and the
//! registry are reached through ports.

use crate::domain::entities::{ValidatedVote, ValidatorConfig, VoteRequest};
use crate::domain::errors::{ValidationError, ValidationResult};
use crate::domain::rules::{canonical_message, check_freshness, check_result_format, parse_role};
use crate::ports::inbound::VoteValidationApi;
use crate::ports::outbound::{IdentityProvider, OperatorRegistry, SignatureVerifier, TimeSource};
use ag_01_store::KeyValueStore;
use async_trait::async_trait;
use shared_types::{finished_key, TaskSubmission};
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs the admission checks for incoming votes.
pub struct VoteValidator {
    config: ValidatorConfig,
    store: Arc<dyn KeyValueStore>,
    verifier: Arc<dyn SignatureVerifier>,
    identities: Arc<dyn IdentityProvider>,
    registry: Arc<dyn OperatorRegistry>,
    clock: Arc<dyn TimeSource>,
}

impl VoteValidator {
    pub fn new(
        config: ValidatorConfig,
        store: Arc<dyn KeyValueStore>,
        verifier: Arc<dyn SignatureVerifier>,
        identities: Arc<dyn IdentityProvider>,
        registry: Arc<dyn OperatorRegistry>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            store,
            verifier,
            identities,
            registry,
            clock,
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    async fn run_checks(&self, request: &VoteRequest) -> ValidationResult<ValidatedVote> {
        // 1. Role
        let role = parse_role(&request.role)?;

        // 2. Freshness
        check_freshness(
            request.timestamp,
            self.clock.now(),
            self.config.freshness_window_secs,
        )?;

        // 3. Identity
        let address = self
            .identities
            .identity_of(&request.pub_key)
            .map_err(|e| ValidationError::MalformedKey(e.to_string()))?;

        // 4. Result shape
        check_result_format(role, &request.result)?;

        // 5. Signature
        let message = canonical_message(
            &self.config.domain_hash,
            request.timestamp,
            request.task_id,
            &request.result,
        );
        match self
            .verifier
            .verify(&request.pub_key, message.as_bytes(), &request.signature)
        {
            Ok(true) => {}
            Ok(false) => return Err(ValidationError::InvalidSignature),
            Err(e) => {
                debug!(operator = %address, error = %e, "Undecodable signature");
                return Err(ValidationError::InvalidSignature);
            }
        }

        // 6. Finished marker
        if self.store.exists(&finished_key(request.task_id)).await? {
            return Err(ValidationError::TaskAlreadyFinished(request.task_id));
        }

        // 7. Registry
        match self.registry.is_registered(&address).await {
            Ok(true) => {}
            Ok(false) => return Err(ValidationError::UnknownOperator(address)),
            Err(e) => {
                warn!(operator = %address, error = %e, "Operator registry lookup failed");
                return Err(ValidationError::UnknownOperator(address));
            }
        }

        Ok(ValidatedVote {
            task_id: request.task_id,
            submission: TaskSubmission {
                address,
                result: request.result.clone(),
                timestamp: request.timestamp,
                role,
            },
        })
    }
}

#[async_trait]
impl VoteValidationApi for VoteValidator {
    async fn validate(&self, request: &VoteRequest) -> ValidationResult<ValidatedVote> {
        let outcome = self.run_checks(request).await;
        if let Err(e) = &outcome {
            debug!(
                task_id = request.task_id,
                role = %request.role,
                kind = e.kind(),
                "Vote rejected"
            );
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedTimeSource;
    use crate::adapters::registry::StaticOperatorRegistry;
    use crate::adapters::secp256k1::{address_from_pubkey, Secp256k1Identity};
    use crate::ports::outbound::RegistryError;
    use ag_01_store::InMemoryStore;
    use k256::ecdsa::signature::hazmat::PrehashSigner;
    use k256::ecdsa::{Signature, SigningKey};
    use sha2::{Digest, Sha256};
    use shared_types::{OperatorAddress, Role};

    const DOMAIN: &str = "0xdomain";
    const NOW: i64 = 1_700_000_000;

    struct Operator {
        key: SigningKey,
        public: String,
        address: OperatorAddress,
    }

    impl Operator {
        fn random() -> Self {
            let key = SigningKey::random(&mut rand::thread_rng());
            let public = hex::encode(key.verifying_key().to_encoded_point(true).as_bytes());
            let address = address_from_pubkey(key.verifying_key());
            Self {
                key,
                public,
                address,
            }
        }

        fn vote(&self, task_id: u64, role: &str, result: &str, timestamp: i64) -> VoteRequest {
            let message = canonical_message(DOMAIN, timestamp, task_id, result);
            let signature: Signature = self
                .key
                .sign_prehash(&Sha256::digest(message.as_bytes()))
                .unwrap();
            VoteRequest {
                task_id,
                result: result.to_string(),
                timestamp,
                signature: hex::encode(signature.to_bytes()),
                pub_key: self.public.clone(),
                role: role.to_string(),
            }
        }
    }

    struct FailingRegistry;

    #[async_trait]
    impl OperatorRegistry for FailingRegistry {
        async fn is_registered(&self, _: &OperatorAddress) -> Result<bool, RegistryError> {
            Err(RegistryError::Unavailable("rpc down".into()))
        }
    }

    fn validator_with(
        store: Arc<InMemoryStore>,
        registry: Arc<dyn OperatorRegistry>,
    ) -> VoteValidator {
        let crypto = Arc::new(Secp256k1Identity::new());
        VoteValidator::new(
            ValidatorConfig::new(DOMAIN),
            store,
            crypto.clone(),
            crypto,
            registry,
            Arc::new(FixedTimeSource::new(NOW)),
        )
    }

    fn setup(operator: &Operator) -> (Arc<InMemoryStore>, VoteValidator) {
        let store = Arc::new(InMemoryStore::new());
        let registry = Arc::new(StaticOperatorRegistry::new([operator.address.as_str()]));
        let validator = validator_with(store.clone(), registry);
        (store, validator)
    }

    #[tokio::test]
    async fn test_valid_performer_vote() {
        let op = Operator::random();
        let (_, validator) = setup(&op);

        let vote = validator
            .validate(&op.vote(7, "performer", "100-0xabc", NOW - 5))
            .await
            .unwrap();

        assert_eq!(vote.task_id, 7);
        assert_eq!(vote.submission.address, op.address);
        assert_eq!(vote.submission.role, Role::Performer);
        assert_eq!(vote.submission.result, "100-0xabc");
    }

    #[tokio::test]
    async fn test_invalid_role_checked_first() {
        let op = Operator::random();
        let (_, validator) = setup(&op);

        // Also stale and badly shaped: role wins.
        let mut request = op.vote(1, "attester", "maybe", NOW - 1_000);
        request.role = "observer".into();

        assert_eq!(
            validator.validate(&request).await,
            Err(ValidationError::InvalidRole("observer".into()))
        );
    }

    #[tokio::test]
    async fn test_stale_vote_rejected_even_if_signed() {
        let op = Operator::random();
        let (_, validator) = setup(&op);

        let result = validator
            .validate(&op.vote(1, "attester", "true", NOW - 121))
            .await;
        assert!(matches!(
            result,
            Err(ValidationError::StaleOrFutureTimestamp { .. })
        ));
    }

    #[tokio::test]
    async fn test_future_vote_rejected() {
        let op = Operator::random();
        let (_, validator) = setup(&op);

        let result = validator
            .validate(&op.vote(1, "attester", "true", NOW + 1))
            .await;
        assert!(matches!(
            result,
            Err(ValidationError::StaleOrFutureTimestamp { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_key() {
        let op = Operator::random();
        let (_, validator) = setup(&op);

        let mut request = op.vote(1, "attester", "true", NOW);
        request.pub_key = "not-hex".into();

        assert!(matches!(
            validator.validate(&request).await,
            Err(ValidationError::MalformedKey(_))
        ));
    }

    #[tokio::test]
    async fn test_result_shape_checked_before_signature() {
        let op = Operator::random();
        let (_, validator) = setup(&op);

        let mut request = op.vote(1, "performer", "true", NOW);
        request.signature = "00".into();

        assert_eq!(
            validator.validate(&request).await,
            Err(ValidationError::InvalidResultFormat {
                role: Role::Performer,
                result: "true".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_signature_bound_to_task() {
        let op = Operator::random();
        let (_, validator) = setup(&op);

        let mut request = op.vote(1, "attester", "true", NOW);
        request.task_id = 2;

        assert_eq!(
            validator.validate(&request).await,
            Err(ValidationError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn test_signature_bound_to_domain() {
        let op = Operator::random();
        let (store, _) = setup(&op);
        let registry = Arc::new(StaticOperatorRegistry::new([op.address.as_str()]));
        let crypto = Arc::new(Secp256k1Identity::new());
        let other_domain = VoteValidator::new(
            ValidatorConfig::new("0xother"),
            store,
            crypto.clone(),
            crypto,
            registry,
            Arc::new(FixedTimeSource::new(NOW)),
        );

        assert_eq!(
            other_domain
                .validate(&op.vote(1, "attester", "true", NOW))
                .await,
            Err(ValidationError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn test_garbage_signature_is_invalid_signature() {
        let op = Operator::random();
        let (_, validator) = setup(&op);

        let mut request = op.vote(1, "attester", "true", NOW);
        request.signature = "xyz".into();

        assert_eq!(
            validator.validate(&request).await,
            Err(ValidationError::InvalidSignature)
        );
    }

    #[tokio::test]
    async fn test_finished_task_rejected() {
        let op = Operator::random();
        let (store, validator) = setup(&op);
        store.set(&finished_key(9), b"1".to_vec(), None).await.unwrap();

        assert_eq!(
            validator
                .validate(&op.vote(9, "attester", "true", NOW))
                .await,
            Err(ValidationError::TaskAlreadyFinished(9))
        );
    }

    #[tokio::test]
    async fn test_unregistered_operator() {
        let op = Operator::random();
        let stranger = Operator::random();
        let (_, validator) = setup(&op);

        assert_eq!(
            validator
                .validate(&stranger.vote(1, "attester", "false", NOW))
                .await,
            Err(ValidationError::UnknownOperator(stranger.address.clone()))
        );
    }

    #[tokio::test]
    async fn test_registry_failure_maps_to_unknown_operator() {
        let op = Operator::random();
        let validator = validator_with(Arc::new(InMemoryStore::new()), Arc::new(FailingRegistry));

        assert_eq!(
            validator
                .validate(&op.vote(1, "attester", "true", NOW))
                .await,
            Err(ValidationError::UnknownOperator(op.address.clone()))
        );
    }
}
