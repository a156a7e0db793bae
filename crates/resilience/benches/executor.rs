//! Benchmarks for the retry executor
//!
//! Measures:
//! - Worker::run overhead on an immediately successful call
//! - Full retry cycle for a call that exhausts its attempts
//! - Skip path once the circuit is open

use converge_resilience::{Executor, ExecutorConfig};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn executor(attempt: u32, break_after: Option<u32>) -> Executor {
    let mut builder = ExecutorConfig::builder("bench").attempt(attempt);
    if let Some(n) = break_after {
        builder = builder.break_after_n_failure(n);
    }
    Executor::new(builder.build().unwrap())
}

fn run_success(c: &mut Criterion) {
    let mut worker = executor(1, None).worker();
    c.bench_function("worker/run/success", |b| {
        b.iter(|| black_box(worker.run(|| Ok::<_, &str>(black_box(42_u64)))));
    });
}

fn run_exhausted(c: &mut Criterion) {
    let mut group = c.benchmark_group("worker/run/exhausted");

    for &attempts in &[1_u32, 3, 10] {
        group.bench_with_input(
            BenchmarkId::from_parameter(attempts),
            &attempts,
            |b, &attempts| {
                let mut worker = executor(attempts, None).worker();
                b.iter(|| black_box(worker.run(|| Err::<u64, _>(black_box("down")))));
            },
        );
    }

    group.finish();
}

fn run_skipped(c: &mut Criterion) {
    let mut worker = executor(1, Some(1)).worker();
    let _ = worker.run(|| Err::<u64, _>("trip"));

    c.bench_function("worker/run/skipped", |b| {
        b.iter(|| black_box(worker.run(|| Ok::<_, &str>(black_box(1_u64)))));
    });
}

criterion_group!(benches, run_success, run_exhausted, run_skipped);
criterion_main!(benches);
