//! Benchmark of the bias report and mitigation transforms
//!
//! Run with: cargo bench --bench mitigation_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use biasbuster::bias::{compute_bias_report, mitigate, AdjustOptions, BiasConfig, Strategy};

const GROUPS: [&str; 4] = ["a", "b", "c", "d"];

/// Synthetic applicants where positive rates fall with the group index
fn generate_test_dataframe(n_rows: usize, seed: u64) -> DataFrame {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let mut group = Vec::with_capacity(n_rows);
    let mut score = Vec::with_capacity(n_rows);
    let mut hired = Vec::with_capacity(n_rows);
    for _ in 0..n_rows {
        // Skewed group sizes: "a" is the most common
        let g = ((rng.gen::<f64>().powi(2)) * GROUPS.len() as f64) as usize;
        let g = g.min(GROUPS.len() - 1);
        let s = rng.gen::<f64>();
        group.push(GROUPS[g]);
        score.push(s);
        hired.push(i32::from(s > 0.3 + 0.1 * g as f64));
    }

    df! {
        "group" => group,
        "score" => score,
        "hired" => hired,
    }
    .unwrap()
}

/// Report cost as the dataset grows
fn benchmark_report_by_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_by_rows");
    group.sample_size(30);

    let config = BiasConfig::new("group").with_target("hired");
    for n_rows in [1_000, 10_000, 100_000] {
        let df = generate_test_dataframe(n_rows, 42);
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::new("report", n_rows), &df, |b, df| {
            b.iter(|| {
                let _ = compute_bias_report(black_box(df), black_box(&config));
            });
        });
    }

    group.finish();
}

/// Compare the three mitigation strategies on the same data
fn benchmark_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("mitigation_strategies");
    group.sample_size(20);

    let n_rows = 50_000;
    let df = generate_test_dataframe(n_rows, 42);
    group.throughput(Throughput::Elements(n_rows as u64));

    let strategies = [
        (
            "reweigh",
            BiasConfig::new("group").with_target("hired"),
            Strategy::Reweigh,
        ),
        (
            "resample",
            BiasConfig::new("group").with_target("hired"),
            Strategy::Resample { seed: 42 },
        ),
        (
            "adjust",
            BiasConfig::new("group").with_target("score"),
            Strategy::Adjust(AdjustOptions::default()),
        ),
    ];

    for (name, config, strategy) in &strategies {
        group.bench_with_input(BenchmarkId::new(*name, n_rows), &df, |b, df| {
            b.iter(|| {
                let _ = mitigate(black_box(df), black_box(config), black_box(strategy));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_report_by_rows, benchmark_strategies);
criterion_main!(benches);
