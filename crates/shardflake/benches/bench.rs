use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use shardflake::{CUSTOM_EPOCH, IdGenStatus, IdGenerator, MonotonicClock, TimeSource};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

struct FixedMockTime {
    millis: i64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> i64 {
        self.millis
    }
}

// One full millisecond worth of sequence; a fixed clock never runs past it.
const IDS_PER_MILLI: usize = 1024;

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

/// Hot path: a fixed clock, so every mint is `Ready` and the lock is
/// uncontended.
fn bench_hot_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("mint/fixed_clock");
    group.throughput(Throughput::Elements(IDS_PER_MILLI as u64));

    group.bench_function(format!("elems/{IDS_PER_MILLI}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator =
                    IdGenerator::with_clock(CUSTOM_EPOCH, 1, FixedMockTime { millis: CUSTOM_EPOCH + 1 })
                        .unwrap();
                for _ in 0..IDS_PER_MILLI {
                    match generator.poll_mint().unwrap() {
                        IdGenStatus::Ready { id } => {
                            black_box(id);
                        }
                        IdGenStatus::Pending { .. } => unreachable!(),
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Realistic wall-clock behavior: mints may wait out an exhausted
/// millisecond.
fn bench_monotonic(c: &mut Criterion) {
    let mut group = c.benchmark_group("mint/monotonic_clock");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    let generator = IdGenerator::new(CUSTOM_EPOCH, 1).unwrap();
    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generator.mint().unwrap());
            }
        });
    });

    group.finish();
}

/// Several threads contending on one generator.
fn bench_contended(c: &mut Criterion) {
    for threads in [2, 4, 8] {
        let mut group = c.benchmark_group(format!("mint/contended/threads/{threads}"));
        group.throughput(Throughput::Elements((TOTAL_IDS * threads) as u64));

        let clock = MonotonicClock::new();
        let generator = Arc::new(IdGenerator::with_clock(CUSTOM_EPOCH, 1, clock).unwrap());

        group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
            b.iter_custom(|iters| {
                let barrier = Arc::new(Barrier::new(threads + 1));
                let start = scope(|s| {
                    for _ in 0..threads {
                        let barrier = Arc::clone(&barrier);
                        let generator = Arc::clone(&generator);
                        s.spawn(move || {
                            barrier.wait();
                            for _ in 0..iters {
                                for _ in 0..TOTAL_IDS {
                                    black_box(generator.mint().unwrap());
                                }
                            }
                        });
                    }
                    barrier.wait();
                    Instant::now()
                });
                start.elapsed()
            });
        });

        group.finish();
    }
}

criterion_group!(benches, bench_hot_path, bench_monotonic, bench_contended);
criterion_main!(benches);
