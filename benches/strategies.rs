use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use htmref::cell::CounterCell;
use htmref::{Session, SessionConfig, Strategy};

const NUM_THREADS: u32 = 8;
const ITERATIONS_PER_THREAD: u64 = 100_000;

fn bench_contended(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_increment");
    group.sample_size(20);

    for strategy in Strategy::ALL {
        group.bench_function(
            BenchmarkId::new(
                strategy.selector(),
                format!("{}threads x {}iter", NUM_THREADS, ITERATIONS_PER_THREAD),
            ),
            |b| {
                let config = SessionConfig::new(strategy)
                    .with_threads(NUM_THREADS)
                    .with_iterations(ITERATIONS_PER_THREAD);
                b.iter(|| {
                    let outcome = Session::new(config).unwrap().run().unwrap();
                    black_box(outcome.actual)
                })
            },
        );
    }

    group.finish();
}

fn bench_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("uncontended_increment");

    for strategy in Strategy::ALL {
        group.bench_function(
            BenchmarkId::new(strategy.selector(), format!("{}iter", ITERATIONS_PER_THREAD)),
            |b| {
                b.iter(|| {
                    let cell = CounterCell::new();
                    strategy.run(&cell, black_box(ITERATIONS_PER_THREAD));
                    black_box(cell.value())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_contended, bench_uncontended);
criterion_main!(benches);
