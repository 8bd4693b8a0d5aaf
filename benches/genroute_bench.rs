//! Criterion benchmarks for u-genroute.
//!
//! Uses random planar instances to measure fitness evaluation throughput
//! and full-run cost on the sequential and threaded pools.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_genroute::distance::DistanceMatrix;
use u_genroute::ga::fitness::{evaluate, evaluate_parallel};
use u_genroute::ga::{GaConfig, GaRunner, Route};
use u_genroute::pool::{SequentialPool, ThreadPool};
use u_genroute::random::create_rng;

fn random_instance(n: usize, seed: u64) -> DistanceMatrix {
    let mut rng = create_rng(seed);
    let points: Vec<(f64, f64)> = (0..n)
        .map(|_| (rng.random_range(0.0..100.0), rng.random_range(0.0..100.0)))
        .collect();
    DistanceMatrix::from_points(&points)
}

fn random_routes(n: usize, count: usize, seed: u64) -> Vec<Route> {
    let mut rng = create_rng(seed);
    (0..count).map(|_| Route::random(n, &mut rng)).collect()
}

// ===========================================================================
// Fitness evaluation
// ===========================================================================

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let pool = ThreadPool::with_workers(4).expect("pool");

    for &n in &[20, 50, 100] {
        let dm = random_instance(n, 42);
        let routes = random_routes(n, 10_000, 7);

        group.bench_with_input(BenchmarkId::new("sequential", n), &routes, |b, r| {
            b.iter(|| black_box(evaluate(black_box(r), &dm, 1e6)))
        });
        group.bench_with_input(BenchmarkId::new("threaded_w4", n), &routes, |b, r| {
            b.iter(|| black_box(evaluate_parallel(&pool, black_box(r), &dm, 1e6)))
        });
    }
    group.finish();
}

// ===========================================================================
// Full runs
// ===========================================================================

fn run_config() -> GaConfig {
    GaConfig::default()
        .with_population_size(1_000)
        .with_num_tournaments(50)
        .with_tournament_size(20)
        .with_worker_count(4)
        .with_num_generations(30)
        .with_seed(42)
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("ga_run");
    group.sample_size(10);

    for &n in &[20, 50] {
        let dm = random_instance(n, 42);

        let seq = GaRunner::with_pool(
            dm.clone(),
            run_config(),
            SequentialPool::with_workers(4).expect("pool"),
        )
        .expect("valid config");
        group.bench_with_input(BenchmarkId::new("sequential", n), &seq, |b, r| {
            b.iter(|| black_box(r.run_with_observer(&mut ()).expect("run")))
        });

        let par = GaRunner::with_pool(
            dm,
            run_config(),
            ThreadPool::with_workers(4).expect("pool"),
        )
        .expect("valid config");
        group.bench_with_input(BenchmarkId::new("threaded", n), &par, |b, r| {
            b.iter(|| black_box(r.run_with_observer(&mut ()).expect("run")))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_run);
criterion_main!(benches);
