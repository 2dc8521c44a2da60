//! Grouping and grouped-evaluation benchmarks.
//!
//! Measures index construction and per-group window evaluation across table sizes.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tidyframe::verbs::{JoinBy, inner_join, mutate};
use tidyframe::{Column, GroupIndex, GroupOptions, GroupedTable, JoinOptions, Table, Value, call, col};

/// Synthetic table with `groups` distinct keys spread over `rows` rows.
fn generate_table(rows: usize, groups: usize) -> Table {
    let keys: Vec<Value> = (0..rows).map(|r| Value::from(format!("key_{:04}", (r * 7) % groups))).collect();
    let values: Vec<Value> = (0..rows).map(|r| Value::from(((r * 31) % 997) as i64)).collect();
    Table::from_columns(vec![("key", Column::new(keys)), ("value", Column::new(values))])
        .expect("valid table")
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    for rows in [1_000, 10_000, 100_000] {
        let table = generate_table(rows, 100);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &table, |b, table| {
            b.iter(|| GroupIndex::build(black_box(table), &["key"], &GroupOptions::default()))
        });
    }
    group.finish();
}

fn bench_grouped_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouped_min_rank");
    for groups in [10, 1_000] {
        let table = GroupedTable::from_source(generate_table(50_000, groups), &["key"], GroupOptions::default())
            .expect("valid grouping");
        let assignments = vec![("r".to_string(), call("min_rank", vec![col("value")]))];
        group.bench_with_input(BenchmarkId::from_parameter(groups), &table, |b, table| {
            b.iter(|| mutate(black_box(table), &assignments))
        });
    }
    group.finish();
}

fn bench_join(c: &mut Criterion) {
    let left = GroupedTable::plain(generate_table(20_000, 500));
    let right = GroupedTable::plain(
        Table::from_columns(vec![
            (
                "key",
                Column::new((0..500).map(|g| Value::from(format!("key_{:04}", g))).collect()),
            ),
            ("label", Column::new((0..500).map(|g| Value::from(g as i64)).collect())),
        ])
        .expect("valid table"),
    );
    c.bench_function("inner_join_20k", |b| {
        b.iter(|| inner_join(black_box(&left), &right, &JoinBy::Infer, &JoinOptions::default()))
    });
}

criterion_group!(benches, bench_index_build, bench_grouped_rank, bench_join);
criterion_main!(benches);
