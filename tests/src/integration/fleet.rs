//! # Fleet Reconciliation
//!
//! Forwards from several aggregator instances meeting in one finalizer.

#[cfg(test)]
mod tests {
    use crate::fixtures::{consensus, fleet, Harness};
    use ag_01_store::KeyValueStore;
    use ag_03_task_verification::AggregatorApi;
    use ag_04_finalizer::{ForwardOutcome, SettlementCall};
    use shared_types::{settled_key, tally_key, FinalizedResult, FINALIZATION_QUEUE};

    const TASK: u64 = 42;

    fn forward(operator: &str, result: i64, forwarder: &str) -> Vec<u8> {
        FinalizedResult {
            task_id: TASK,
            operator: operator.into(),
            result,
            forwarder: Some(forwarder.to_string()),
        }
        .encode()
        .unwrap()
    }

    async fn push(harness: &Harness, entry: Vec<u8>) {
        harness.store.push(FINALIZATION_QUEUE, entry).await.unwrap();
    }

    #[tokio::test]
    async fn test_second_forward_reaches_threshold() {
        let harness = Harness::with_config(0, "agg-1", consensus(3, 67), fleet(2));

        push(&harness, forward("0xa", 1, "agg-1")).await;
        assert_eq!(harness.drain().await, vec![ForwardOutcome::Tallied { count: 1 }]);
        assert!(harness.gateway.calls().is_empty());

        push(&harness, forward("0xb", 1, "agg-2")).await;
        assert_eq!(harness.drain().await, vec![ForwardOutcome::Settled { result: 1 }]);
        assert_eq!(
            harness.gateway.calls(),
            vec![SettlementCall {
                task_id: TASK,
                result: 1,
                operators: "0xa&0xb".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_retried_forward_does_not_inflate_tally() {
        let harness = Harness::with_config(0, "agg-1", consensus(3, 67), fleet(2));

        push(&harness, forward("0xa", 1, "agg-1")).await;
        push(&harness, forward("0xa", 1, "agg-1")).await;

        assert_eq!(
            harness.drain().await,
            vec![
                ForwardOutcome::Tallied { count: 1 },
                ForwardOutcome::Tallied { count: 1 },
            ]
        );
        assert!(harness.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_split_fleet_does_not_settle() {
        let harness = Harness::with_config(0, "agg-1", consensus(3, 67), fleet(2));

        push(&harness, forward("0xa", 1, "agg-1")).await;
        push(&harness, forward("0xb", 0, "agg-2")).await;

        assert_eq!(
            harness.drain().await,
            vec![
                ForwardOutcome::Tallied { count: 1 },
                ForwardOutcome::Tallied { count: 1 },
            ]
        );
        assert!(harness.store.exists(&tally_key(TASK)).await.unwrap());
        assert!(!harness.store.exists(&settled_key(TASK)).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_settlement_retried_by_later_forward() {
        let harness = Harness::with_config(0, "agg-1", consensus(3, 67), fleet(1));
        harness.gateway.set_failing(true);

        push(&harness, forward("0xa", 1, "agg-1")).await;
        let failed = harness.drain().await;
        assert!(matches!(failed[..], [ForwardOutcome::SettlementFailed { .. }]));
        assert!(harness.store.exists(&tally_key(TASK)).await.unwrap());

        harness.gateway.set_failing(false);
        push(&harness, forward("0xa", 1, "agg-1")).await;

        assert_eq!(harness.drain().await, vec![ForwardOutcome::Settled { result: 1 }]);
        assert_eq!(harness.gateway.calls().last().unwrap().operators, "0xa");
    }

    #[tokio::test]
    async fn test_late_forward_after_settlement_ignored() {
        let harness = Harness::with_config(0, "agg-1", consensus(3, 67), fleet(1));

        push(&harness, forward("0xa", 1, "agg-1")).await;
        push(&harness, forward("0xb", 1, "agg-2")).await;

        assert_eq!(
            harness.drain().await,
            vec![
                ForwardOutcome::Settled { result: 1 },
                ForwardOutcome::AlreadySettled,
            ]
        );
        assert_eq!(harness.gateway.calls().len(), 1);
    }

    /// Two instances decide the same task from their own votes; both forward
    /// into the queue the finalizer drains.
    #[tokio::test]
    async fn test_two_instances_reconcile() {
        let east = Harness::with_config(4, "agg-east", consensus(3, 67), fleet(2));
        let west = Harness::with_config(4, "agg-west", consensus(3, 67), fleet(2));

        for instance in [&east, &west] {
            instance
                .service
                .submit_vote(instance.operator(0).perform(TASK, "100-0xabc"))
                .await
                .unwrap();
            for i in 1..4 {
                instance
                    .service
                    .submit_vote(instance.operator(i).attest(TASK, true))
                    .await
                    .unwrap();
            }
        }

        // Relay west's forward into east's queue.
        let relayed = west.store.blocking_pop(FINALIZATION_QUEUE).await.unwrap();
        east.store.push(FINALIZATION_QUEUE, relayed).await.unwrap();

        assert_eq!(
            east.drain().await,
            vec![
                ForwardOutcome::Tallied { count: 1 },
                ForwardOutcome::Settled { result: 1 },
            ]
        );
        assert_eq!(
            east.gateway.calls()[0].operators,
            format!(
                "{}&{}",
                east.operator(0).address.as_str(),
                west.operator(0).address.as_str()
            )
        );
        assert!(west.gateway.calls().is_empty());
    }
}
