//! # Task Aggregator Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Consensus evaluation | < 1µs per record |
//! | Vote signature verification | < 1ms |
//! | Full vote submission (in-memory store) | < 1ms |

use ag_02_vote_validation::{canonical_message, Secp256k1Identity, SignatureVerifier};
use ag_03_task_verification::{evaluate, AggregatorApi, ConsensusConfig, TaskVerificationRecord};
use ag_tests::fixtures::{Harness, Operator, DOMAIN_HASH, NOW};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use shared_types::{Role, TaskSubmission};

fn record(attesters: usize) -> TaskVerificationRecord {
    let mut record = TaskVerificationRecord::new();
    record
        .insert(
            1,
            TaskSubmission {
                address: "0xperformer".into(),
                result: "100-0xabc".into(),
                timestamp: NOW,
                role: Role::Performer,
            },
        )
        .unwrap();
    for i in 0..attesters {
        record
            .insert(
                1,
                TaskSubmission {
                    address: shared_types::OperatorAddress::new(format!("0x{i:040x}")),
                    result: if i % 3 == 0 { "false" } else { "true" }.into(),
                    timestamp: NOW,
                    role: Role::Attester,
                },
            )
            .unwrap();
    }
    record
}

fn bench_consensus_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("consensus-evaluation");
    let config = ConsensusConfig::default();

    for attesters in [3, 30, 300] {
        let record = record(attesters);
        group.throughput(Throughput::Elements(attesters as u64));
        group.bench_with_input(BenchmarkId::new("evaluate", attesters), &record, |b, record| {
            b.iter(|| black_box(evaluate(record, &config)))
        });
    }
    group.finish();
}

fn bench_signature_verification(c: &mut Criterion) {
    let operator = Operator::random();
    let vote = operator.attest(9, true);
    let message = canonical_message(DOMAIN_HASH, vote.timestamp, vote.task_id, &vote.result);
    let identity = Secp256k1Identity::new();

    c.bench_function("vote-signature-verify", |b| {
        b.iter(|| {
            black_box(
                identity
                    .verify(&vote.pub_key, message.as_bytes(), &vote.signature)
                    .unwrap(),
            )
        })
    });
}

fn bench_vote_submission(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let harness = Harness::new(2);
    let attester = harness.operator(1);
    let mut task_id = 0u64;

    c.bench_function("vote-submission", |b| {
        b.iter(|| {
            task_id += 1;
            let vote = attester.attest(task_id, true);
            runtime.block_on(async { black_box(harness.service.submit_vote(vote).await.unwrap()) })
        })
    });
}

criterion_group!(
    benches,
    bench_consensus_evaluation,
    bench_signature_verification,
    bench_vote_submission
);
criterion_main!(benches);
