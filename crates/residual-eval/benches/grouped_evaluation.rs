//! Grouped evaluation benchmarks.
//!
//! Measures the single-pair engine and how grouped evaluation scales with the
//! number of groups and worker threads.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array1;

use residual_eval::eval::evaluate;
use residual_eval::metrics::{compute_residual_metrics, MetricSet};
use residual_eval::testing::{synthetic_grouped_dataset, synthetic_pairs, PREDICTION_COL, TARGET_COL};
use residual_eval::Parallelism;

// =============================================================================
// Engine Benchmarks
// =============================================================================

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/compute");

    for &n in &[100usize, 10_000, 1_000_000] {
        let (targets, predictions) = synthetic_pairs(n, 42, 0.5);
        let targets = Array1::from(targets);
        let predictions = Array1::from(predictions);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                black_box(compute_residual_metrics(
                    black_box(predictions.view()),
                    black_box(targets.view()),
                ))
            });
        });
    }

    group.finish();
}

// =============================================================================
// Thread Scaling Benchmarks
// =============================================================================

/// Compare sequential and parallel grouped evaluation at a fixed row count.
fn bench_grouped_thread_scaling(c: &mut Criterion) {
    let n_rows = 200_000;
    let metrics = MetricSet::all();

    for &n_groups in &[10usize, 1_000] {
        let dataset = synthetic_grouped_dataset(n_groups, n_rows / n_groups, 42);

        let mut group = c.benchmark_group(format!("grouped/thread_scaling/{n_groups}_groups"));
        group.throughput(Throughput::Elements(n_rows as u64));

        for &num_threads in &[2usize, 4, 8] {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .unwrap();

            group.bench_with_input(
                BenchmarkId::new("parallel", num_threads),
                &dataset,
                |b, dataset| {
                    b.iter(|| {
                        pool.install(|| {
                            black_box(evaluate(
                                black_box(dataset),
                                TARGET_COL,
                                PREDICTION_COL,
                                &metrics,
                                false,
                                false,
                                Parallelism::Parallel,
                            ))
                        })
                    });
                },
            );
        }

        // Sequential baseline
        group.bench_with_input(BenchmarkId::new("sequential", 1), &dataset, |b, dataset| {
            b.iter(|| {
                black_box(evaluate(
                    black_box(dataset),
                    TARGET_COL,
                    PREDICTION_COL,
                    &metrics,
                    false,
                    false,
                    Parallelism::Sequential,
                ))
            });
        });

        group.finish();
    }
}

criterion_group!(benches, bench_engine, bench_grouped_thread_scaling);
criterion_main!(benches);
