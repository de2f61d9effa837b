//! # Vote Flow
//!
//! Signed votes through validation, recording, local consensus, the
//! finalization gate and the finalizer, all over one store.
//!
//! ```text
//! performer + attesters ──→ AggregatorService ──→ finished:{id} + task_queue
//!                                                        │
//!                                           Finalizer ←──┘ ──→ settlement
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{Harness, NOW};
    use ag_01_store::KeyValueStore;
    use ag_02_vote_validation::ValidationError;
    use ag_03_task_verification::{
        AggregatorApi, AggregatorError, ConsensusOutcome, SubmissionOutcome,
    };
    use ag_04_finalizer::{ForwardOutcome, SettlementCall};
    use shared_types::{finished_key, settled_key, verification_key, FinalizedResult};
    use std::sync::Arc;

    const TASK: u64 = 42;

    async fn submit_all(harness: &Harness, approvals: &[bool]) -> SubmissionOutcome {
        let performer = harness.operator(0);
        harness
            .service
            .submit_vote(performer.perform(TASK, "100-0xabc"))
            .await
            .unwrap();

        let mut last = SubmissionOutcome::Accepted;
        for (i, approve) in approvals.iter().enumerate() {
            last = harness
                .service
                .submit_vote(harness.operator(i + 1).attest(TASK, *approve))
                .await
                .unwrap();
        }
        last
    }

    #[tokio::test]
    async fn test_approved_task_is_settled_once() {
        let harness = Harness::new(4);

        let outcome = submit_all(&harness, &[true, true, false]).await;

        assert_eq!(
            outcome,
            SubmissionOutcome::Decided(ConsensusOutcome::Approved {
                result: "100-0xabc".into()
            })
        );
        assert!(harness.store.exists(&finished_key(TASK)).await.unwrap());
        assert_eq!(harness.queue_len().await, 1);

        let outcomes = harness.drain().await;

        assert_eq!(outcomes, vec![ForwardOutcome::Settled { result: 1 }]);
        assert_eq!(
            harness.gateway.calls(),
            vec![SettlementCall {
                task_id: TASK,
                result: 1,
                operators: harness.operator(0).address.as_str().to_string(),
            }]
        );
        assert!(harness.store.exists(&settled_key(TASK)).await.unwrap());
        assert!(!harness.store.exists(&verification_key(TASK)).await.unwrap());
    }

    #[tokio::test]
    async fn test_rejected_task_settles_zero() {
        let harness = Harness::new(4);

        let outcome = submit_all(&harness, &[false, false, true]).await;

        assert_eq!(outcome, SubmissionOutcome::Decided(ConsensusOutcome::Rejected));
        assert_eq!(harness.drain().await, vec![ForwardOutcome::Settled { result: 0 }]);
        assert_eq!(harness.gateway.calls()[0].result, 0);
    }

    #[tokio::test]
    async fn test_queue_entry_names_performer_and_instance() {
        let harness = Harness::new(4);
        submit_all(&harness, &[true, true, true]).await;

        let raw = harness
            .store
            .blocking_pop(shared_types::FINALIZATION_QUEUE)
            .await
            .unwrap();
        let entry = FinalizedResult::decode(&raw).unwrap();

        assert_eq!(entry.task_id, TASK);
        assert_eq!(entry.operator, harness.operator(0).address);
        assert_eq!(entry.result, 1);
        assert_eq!(entry.forwarder.as_deref(), Some("agg-1"));
    }

    #[tokio::test]
    async fn test_votes_after_finalization_are_rejected() {
        let harness = Harness::new(5);
        submit_all(&harness, &[true, true, true]).await;

        let late = harness
            .service
            .submit_vote(harness.operator(4).attest(TASK, false))
            .await;

        assert_eq!(
            late,
            Err(AggregatorError::Validation(
                ValidationError::TaskAlreadyFinished(TASK)
            ))
        );
        assert_eq!(harness.queue_len().await, 1);
    }

    #[tokio::test]
    async fn test_finished_marker_survives_settlement() {
        let harness = Harness::new(4);
        submit_all(&harness, &[true, true, true]).await;
        harness.drain().await;

        // Settlement cleans up the record but never the acceptance marker.
        assert!(harness.store.exists(&finished_key(TASK)).await.unwrap());
        let replay = harness
            .service
            .submit_vote(harness.operator(0).perform(TASK, "100-0xabc"))
            .await;
        assert!(matches!(
            replay,
            Err(AggregatorError::Validation(ValidationError::TaskAlreadyFinished(_)))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_attester_is_rejected() {
        let harness = Harness::new(3);
        let attester = harness.operator(1);
        harness
            .service
            .submit_vote(harness.operator(0).perform(TASK, "100-0xabc"))
            .await
            .unwrap();
        harness
            .service
            .submit_vote(attester.attest(TASK, true))
            .await
            .unwrap();

        let again = harness.service.submit_vote(attester.attest(TASK, false)).await;

        assert!(matches!(
            again,
            Err(AggregatorError::AttesterAlreadySubmitted { .. })
        ));
    }

    #[tokio::test]
    async fn test_stale_vote_is_rejected() {
        let harness = Harness::new(2);
        let stale = harness
            .operator(0)
            .vote_at(TASK, "100-0xabc", "performer", NOW - 3600);

        let result = harness.service.submit_vote(stale).await;

        assert!(matches!(
            result,
            Err(AggregatorError::Validation(ValidationError::StaleOrFutureTimestamp { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unregistered_operator_is_rejected() {
        let harness = Harness::new(1);
        let outsider = crate::fixtures::Operator::random();

        let result = harness
            .service
            .submit_vote(outsider.perform(TASK, "100-0xabc"))
            .await;

        assert!(matches!(
            result,
            Err(AggregatorError::Validation(ValidationError::UnknownOperator(_)))
        ));
    }

    #[tokio::test]
    async fn test_tampered_result_fails_signature() {
        let harness = Harness::new(1);
        let mut vote = harness.operator(0).perform(TASK, "100-0xabc");
        vote.result = "101-0xabc".into();

        let result = harness.service.submit_vote(vote).await;

        assert_eq!(
            result,
            Err(AggregatorError::Validation(ValidationError::InvalidSignature))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_performers_single_winner() {
        let harness = Arc::new(Harness::new(6));

        let mut handles = Vec::new();
        for i in 0..6 {
            let harness = harness.clone();
            handles.push(tokio::spawn(async move {
                let vote = harness.operator(i).perform(TASK, &format!("{}-0xabc", 100 + i));
                harness.service.submit_vote(vote).await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(e) => assert!(matches!(e, AggregatorError::PerformerAlreadySubmitted(TASK))),
            }
        }

        assert_eq!(accepted, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deciding_votes_enqueue_once() {
        let harness = Arc::new(Harness::new(9));
        harness
            .service
            .submit_vote(harness.operator(0).perform(TASK, "100-0xabc"))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 1..9 {
            let harness = harness.clone();
            handles.push(tokio::spawn(async move {
                harness
                    .service
                    .submit_vote(harness.operator(i).attest(TASK, true))
                    .await
            }));
        }
        for handle in handles {
            // Votes landing after the marker is set are rejected as finished.
            let _ = handle.await.unwrap();
        }

        assert_eq!(harness.queue_len().await, 1);
        assert_eq!(harness.drain().await.len(), 1);
        assert_eq!(harness.gateway.calls().len(), 1);
    }
}
