//! Benchmarks for fitting and validating feature tables.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use drift_guard::inference::KindInferenceEngine;
use drift_guard::prelude::*;
use std::hint::black_box;
use std::time::Duration;

const PLANS: [&str; 4] = ["free", "pro", "team", "enterprise"];

fn make_table(rows: usize, shift: f64) -> FeatureTable {
    FeatureTable::builder()
        .column("spend", (0..rows).map(|i| (i % 1000) as f64 * 0.5 + shift))
        .column("age", (0..rows).map(|i| 18 + (i % 60) as i64))
        .column("plan", (0..rows).map(|i| PLANS[i % PLANS.len()]))
        .column(
            "region",
            (0..rows).map(|i| format!("r{}", (i as f64 + shift) as usize % 50)),
        )
        .build()
        .unwrap()
}

fn kinds() -> FeatureKinds {
    FeatureKinds::infer().categorical("region")
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.measurement_time(Duration::from_secs(5));

    for rows in [1_000, 10_000, 100_000] {
        let table = make_table(rows, 0.0);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            b.iter(|| {
                let mut monitor = DataMonitor::builder().tracing_observer(false).build();
                monitor.fit(black_box(table), &kinds()).unwrap();
                monitor
            })
        });
    }
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    group.measurement_time(Duration::from_secs(5));

    let mut monitor = DataMonitor::builder().tracing_observer(false).build();
    monitor.fit(&make_table(10_000, 0.0), &kinds()).unwrap();

    for (label, shift) in [("no_drift", 0.0), ("drifted", 75.0)] {
        for rows in [1_000, 100_000] {
            let runtime = make_table(rows, shift);
            group.throughput(Throughput::Elements(rows as u64));
            group.bench_with_input(BenchmarkId::new(label, rows), &runtime, |b, runtime| {
                b.iter(|| monitor.validate(black_box(runtime)).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_kind_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("kind_inference");
    let table = make_table(100_000, 0.0);

    for sample in [100, 10_000] {
        let engine = KindInferenceEngine::builder().sample_size(sample).build();
        group.bench_with_input(BenchmarkId::new("sample", sample), &table, |b, table| {
            b.iter(|| engine.infer_table(black_box(table)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fit, bench_validate, bench_kind_inference);
criterion_main!(benches);
