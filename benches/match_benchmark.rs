use criterion::{criterion_group, criterion_main, Criterion};
use mutual_match::db::{MemoryDb, SwipeStore};
use mutual_match::models::{canonical_pair, match_key};
use mutual_match::services::{LogNotifier, MatchDetector, NotificationEmitter};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

fn benchmark_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair_keys");

    group.bench_function("canonical_pair", |b| {
        b.iter(|| canonical_pair(black_box("user-zebra"), black_box("user-aardvark")))
    });

    // IDs that need escaping take the slower encode path
    group.bench_function("match_key_escaped", |b| {
        b.iter(|| match_key(black_box("user:with:colons"), black_box("user with spaces")))
    });

    group.finish();
}

fn benchmark_evaluate(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("Failed to build runtime");
    let db = MemoryDb::new();
    let detector = MatchDetector::new(
        Arc::new(db.clone()),
        NotificationEmitter::new(Arc::new(LogNotifier), Duration::from_secs(1)),
        Duration::from_secs(1),
        Duration::from_millis(1),
    );

    let (one_sided, mutual) = runtime.block_on(async {
        let one_sided = db.upsert_swipe("alice", "carol", true).await.unwrap();
        db.upsert_swipe("bob", "alice", true).await.unwrap();
        let mutual = db.upsert_swipe("alice", "bob", true).await.unwrap();
        (one_sided, mutual)
    });

    let mut group = c.benchmark_group("evaluate");

    group.bench_function("one_sided_like", |b| {
        b.iter(|| runtime.block_on(detector.evaluate(black_box(&one_sided))))
    });

    // After the first iteration this measures the already-matched path
    group.bench_function("mutual_like", |b| {
        b.iter(|| runtime.block_on(detector.evaluate(black_box(&mutual))))
    });

    group.finish();
}

criterion_group!(benches, benchmark_keys, benchmark_evaluate);
criterion_main!(benches);
