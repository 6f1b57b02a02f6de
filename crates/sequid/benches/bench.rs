use core::hint::black_box;
use std::{
    sync::atomic::{AtomicI64, Ordering},
    time::Instant,
};

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use sequid::sequence::SequenceState;

// Number of keys claimed per benchmark iteration.
const TOTAL_KEYS: usize = 4096;

/// Benchmarks the in-block claim fast path: the block is large enough that
/// refills never dominate.
fn bench_block_claims(c: &mut Criterion) {
    const BLOCK: i64 = 1 << 20;

    let mut group = c.benchmark_group("sequence/claim");
    group.throughput(Throughput::Elements(TOTAL_KEYS as u64));

    group.bench_function(format!("elems/{TOTAL_KEYS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let state = SequenceState::new("bench", BLOCK);
                let counter = AtomicI64::new(0);
                for _ in 0..TOTAL_KEYS {
                    let value = state
                        .next_raw(|| {
                            Ok::<_, sequid::Error>(counter.fetch_add(BLOCK, Ordering::Relaxed) + BLOCK)
                        })
                        .unwrap();
                    black_box(value);
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks claims under a refill every iteration: every block holds a
/// single value, so the mutex path runs on each claim.
fn bench_refill_claims(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence/refill");
    group.throughput(Throughput::Elements(TOTAL_KEYS as u64));

    group.bench_function(format!("elems/{TOTAL_KEYS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let state = SequenceState::new("bench", 1);
                let counter = AtomicI64::new(0);
                for _ in 0..TOTAL_KEYS {
                    let value = state
                        .next_raw(|| {
                            Ok::<_, sequid::Error>(counter.fetch_add(1, Ordering::Relaxed) + 1)
                        })
                        .unwrap();
                    black_box(value);
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_block_claims, bench_refill_claims);
criterion_main!(benches);
