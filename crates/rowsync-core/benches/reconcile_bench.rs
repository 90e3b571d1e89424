//! Benchmarks for the reconcile paths.
//!
//! Run with: cargo bench -p rowsync-core --bench reconcile_bench
//!
//! | Scenario       | What it stresses                                 |
//! |----------------|--------------------------------------------------|
//! | items/append   | long equal prefix, one insert                    |
//! | items/churn    | every seventh id replaced, two-cursor planning   |
//! | items/shuffle  | rotation by one, delete + insert at the ends     |
//! | groups/churn   | sequential group deletes/inserts with item carry |

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rowsync_core::{Engine, NullSink, ReportingLevel, ReportingPolicy};

fn ids(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}-{i}")).collect()
}

fn engine_with(n: usize) -> Engine<String> {
    let mut engine = Engine::new()
        .with_policy(ReportingPolicy::new(ReportingLevel::Silent))
        .with_verify_postconditions(false);
    let _ = engine.set_groups(["s"], &mut NullSink);
    let _ = engine.set_items("s", ids("row", n), &mut NullSink);
    engine
}

fn bench_items(c: &mut Criterion) {
    let mut group = c.benchmark_group("items");
    for &n in &[100usize, 1_000] {
        let base = ids("row", n);

        let mut appended = base.clone();
        appended.push("extra".to_string());
        group.bench_with_input(BenchmarkId::new("append", n), &n, |b, &n| {
            b.iter_batched(
                || engine_with(n),
                |mut engine| black_box(engine.set_items("s", appended.clone(), &mut NullSink)),
                criterion::BatchSize::SmallInput,
            );
        });

        let churned: Vec<String> = base
            .iter()
            .enumerate()
            .map(|(i, id)| if i % 7 == 3 { format!("{id}-new") } else { id.clone() })
            .collect();
        group.bench_with_input(BenchmarkId::new("churn", n), &n, |b, &n| {
            b.iter_batched(
                || engine_with(n),
                |mut engine| black_box(engine.set_items("s", churned.clone(), &mut NullSink)),
                criterion::BatchSize::SmallInput,
            );
        });

        let mut rotated = base.clone();
        rotated.rotate_left(1);
        group.bench_with_input(BenchmarkId::new("shuffle", n), &n, |b, &n| {
            b.iter_batched(
                || engine_with(n),
                |mut engine| black_box(engine.set_items("s", rotated.clone(), &mut NullSink)),
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_groups(c: &mut Criterion) {
    let mut group = c.benchmark_group("groups");
    for &n in &[50usize, 500] {
        let old = ids("g", n);
        let new: Vec<String> = old
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 5 != 0)
            .map(|(_, id)| id.clone())
            .chain(ids("h", n / 5))
            .collect();
        group.bench_with_input(BenchmarkId::new("churn", n), &n, |b, _| {
            b.iter_batched(
                || {
                    let mut engine: Engine<String> = Engine::new()
                        .with_policy(ReportingPolicy::new(ReportingLevel::Silent))
                        .with_verify_postconditions(false);
                    let _ = engine.set_groups(old.iter().map(String::as_str), &mut NullSink);
                    engine
                },
                |mut engine| {
                    black_box(engine.set_groups(new.iter().map(String::as_str), &mut NullSink))
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_items, bench_groups);
criterion_main!(benches);
