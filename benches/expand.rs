// benches/expand.rs - pattern compilation and expansion

use bracketed_pattern::BracketedPattern;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

// Include the test fixtures module
include!("../src/fixtures.rs");

/// Benchmark compiling each fixture pattern
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for (i, source) in PATTERNS.iter().enumerate() {
        group.bench_with_input(BenchmarkId::new("pattern", i), source, |b, source| {
            b.iter(|| black_box(BracketedPattern::new(black_box(*source))));
        });
    }

    group.finish();
}

/// Benchmark expanding every record of a store
fn bench_expand_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand_store");
    group.measurement_time(Duration::from_secs(5));

    for &size in &[10, 100, 1000] {
        let db = generate_store(size);
        group.throughput(Throughput::Elements(db.entries().len() as u64));

        for (i, source) in PATTERNS.iter().enumerate() {
            let pattern = BracketedPattern::new(*source);
            group.bench_with_input(
                BenchmarkId::new(format!("pattern{i}"), size),
                &db,
                |b, db| {
                    b.iter(|| {
                        for entry in db.entries() {
                            black_box(pattern.expand(entry, Some(db)).unwrap());
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

/// Benchmark the one-shot helper against a precompiled pattern
fn bench_one_shot(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_shot");
    let db = generate_store(VENUE_RECORDS.len());
    let entry = record(&VENUE_RECORDS[0]);
    let pattern = BracketedPattern::new(PATTERNS[1]);

    group.bench_function("expand_brackets", |b| {
        b.iter(|| {
            black_box(bracketed_pattern::expand_brackets(
                black_box(PATTERNS[1]),
                ';',
                &entry,
                Some(&db),
            ))
        });
    });

    group.bench_function("precompiled", |b| {
        b.iter(|| black_box(pattern.expand(&entry, Some(&db)).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_expand_store, bench_one_shot);
criterion_main!(benches);
