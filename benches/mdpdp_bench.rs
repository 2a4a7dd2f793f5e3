//! Criterion benchmarks for u-mdpdp.
//!
//! Uses synthetic instances on a line (locations at integer positions, toll
//! proportional to distance) so timings reflect algorithm cost only.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_mdpdp::ga::{GaConfig, GaRunner};
use u_mdpdp::model::{PdpProblem, TransportRow, VehicleRow};
use u_mdpdp::random::create_rng;
use u_mdpdp::route::{best_insertion, evaluate};

// ===========================================================================
// Synthetic instance
// ===========================================================================

/// `depots` depots with two vehicles each and `transports` random requests
/// over 40 customer locations.
fn line_problem(depots: usize, transports: usize, seed: u64) -> PdpProblem {
    let mut rng = create_rng(seed);
    let locations = depots + 40;
    let pos: Vec<f64> = (0..locations)
        .map(|_| rng.random_range(0.0..100.0))
        .collect();
    let distance: Vec<Vec<f64>> = pos
        .iter()
        .map(|a| pos.iter().map(|b| f64::abs(a - b)).collect())
        .collect();
    let toll: Vec<Vec<f64>> = distance
        .iter()
        .map(|row| row.iter().map(|d| d * 0.3).collect())
        .collect();

    let vehicles: Vec<VehicleRow> = (0..depots * 2)
        .map(|v| {
            let capacity = if v % 2 == 0 { 20 } else { 12 };
            [v as u32, (v / 2) as u32, capacity, 100, 1, 2]
        })
        .collect();
    let requests: Vec<TransportRow> = (0..transports)
        .map(|_| {
            let pickup = rng.random_range(depots..locations) as u32;
            let delivery = rng.random_range(depots..locations) as u32;
            let ready = rng.random_range(0..50);
            [pickup, delivery, ready, ready + 20, rng.random_range(1..=10)]
        })
        .collect();

    PdpProblem::from_matrices(distance, toll, &vehicles, &requests)
        .expect("synthetic instance is valid")
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    for &n in &[5, 10, 20] {
        let problem = line_problem(1, n, 1);
        let transports: Vec<usize> = (0..n).collect();
        let route = best_insertion(&problem, 0, &transports, &mut create_rng(2))
            .expect("vehicle 0 carries every request");
        group.bench_with_input(BenchmarkId::from_parameter(n), &(problem, route), |b, (p, r)| {
            b.iter(|| black_box(evaluate(black_box(p), 0, black_box(r))))
        });
    }
    group.finish();
}

fn bench_best_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("best_insertion");
    for &n in &[5, 10, 20] {
        let problem = line_problem(1, n, 3);
        let transports: Vec<usize> = (0..n).collect();
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(problem, transports),
            |b, (p, t)| {
                let mut rng = create_rng(4);
                b.iter(|| black_box(best_insertion(black_box(p), 0, black_box(t), &mut rng)))
            },
        );
    }
    group.finish();
}

fn bench_nsga2(c: &mut Criterion) {
    let mut group = c.benchmark_group("nsga2");
    group.sample_size(10);
    for &n in &[10, 25] {
        let problem = line_problem(3, n, 5);
        let config = GaConfig::default()
            .with_population_size(30)
            .with_max_generations(10)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &(problem, config),
            |b, (p, c)| {
                b.iter(|| {
                    let result = GaRunner::run(black_box(p), black_box(c));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_best_insertion, bench_nsga2);
criterion_main!(benches);
