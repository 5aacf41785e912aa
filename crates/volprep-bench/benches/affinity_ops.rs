//! Criterion micro-benchmarks for affinity derivation.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use volprep_affinity::{affinity1, affinity3, affinity_mask3};
use volprep_bench::reference_labels;
use volprep_core::{foreground_mask, Offset};

/// Benchmark: 3-channel affinity at the unit offset.
fn bench_affinity3_unit(c: &mut Criterion) {
    let labels = reference_labels(42);

    c.bench_function("affinity3_unit", |b| {
        b.iter(|| {
            let a = affinity3(black_box(labels.view()), Offset::UNIT).unwrap();
            black_box(a);
        });
    });
}

/// Benchmark: 3-channel affinity at a long-range negative offset.
fn bench_affinity3_long_range(c: &mut Criterion) {
    let labels = reference_labels(42);
    let offset = Offset::new(-2, -9, -9);

    c.bench_function("affinity3_long_range", |b| {
        b.iter(|| {
            let a = affinity3(black_box(labels.view()), offset).unwrap();
            black_box(a);
        });
    });
}

/// Benchmark: single-channel affinity along a diagonal.
fn bench_affinity1_diagonal(c: &mut Criterion) {
    let labels = reference_labels(42);

    c.bench_function("affinity1_diagonal", |b| {
        b.iter(|| {
            let a = affinity1(black_box(labels.view()), Offset::new(1, 3, -3)).unwrap();
            black_box(a);
        });
    });
}

/// Benchmark: 3-channel mask affinity.
fn bench_affinity_mask3(c: &mut Criterion) {
    let mask = foreground_mask(reference_labels(42).view());

    c.bench_function("affinity_mask3_unit", |b| {
        b.iter(|| {
            let a = affinity_mask3(black_box(mask.view()), Offset::UNIT).unwrap();
            black_box(a);
        });
    });
}

criterion_group!(
    benches,
    bench_affinity3_unit,
    bench_affinity3_long_range,
    bench_affinity1_diagonal,
    bench_affinity_mask3
);
criterion_main!(benches);
