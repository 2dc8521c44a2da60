//! End-to-end tests for the verbs and the registry.

use tidyframe::verbs::{Arg, JoinBy, VerbCall, anti_join, inner_join, mutate};
use tidyframe::{
    Column, GroupOptions, GroupedTable, GroupingKind, JoinOptions, Table, TidyError, Value, VerbRegistry,
    call, col, lit,
};

fn ints(xs: &[i64]) -> Vec<Value> {
    xs.iter().map(|&x| Value::from(x)).collect()
}

fn left() -> GroupedTable {
    GroupedTable::plain(
        Table::from_columns(vec![("a", Column::from(vec![1, 2])), ("b", Column::from(vec![10, 20]))]).unwrap(),
    )
}

fn right() -> GroupedTable {
    GroupedTable::plain(
        Table::from_columns(vec![("a", Column::from(vec![2, 3])), ("c", Column::from(vec![99, 100]))]).unwrap(),
    )
}

// =============================================================================
// Joins
// =============================================================================

#[test]
fn test_inner_join_single_match() {
    let out = inner_join(&left(), &right(), &JoinBy::columns(&["a"]), &JoinOptions::default()).unwrap();
    let expected = Table::from_columns(vec![
        ("a", Column::from(vec![2])),
        ("b", Column::from(vec![20])),
        ("c", Column::from(vec![99])),
    ])
    .unwrap();
    assert_eq!(out.table(), &expected);
}

#[test]
fn test_join_matches_integer_and_float_keys() {
    let floats = GroupedTable::plain(
        Table::from_columns(vec![("a", Column::from(vec![1.0, 2.0])), ("c", Column::from(vec![5, 6]))])
            .unwrap(),
    );
    let out = inner_join(&left(), &floats, &JoinBy::columns(&["a"]), &JoinOptions::default()).unwrap();
    assert_eq!(out.nrows(), 2);
    assert_eq!(out.table().column("c").unwrap().values(), ints(&[5, 6]).as_slice());

    let unmatched = anti_join(&left(), &floats, &JoinBy::columns(&["a"])).unwrap();
    assert_eq!(unmatched.nrows(), 0);
}

#[test]
fn test_anti_join_keeps_unmatched_left_row() {
    let out = anti_join(&left(), &right(), &JoinBy::columns(&["a"])).unwrap();
    let expected =
        Table::from_columns(vec![("a", Column::from(vec![1])), ("b", Column::from(vec![10]))]).unwrap();
    assert_eq!(out.table(), &expected);
}

// =============================================================================
// Grouped Verbs
// =============================================================================

#[test]
fn test_grouped_mutate_keeps_group_vars() {
    let table = Table::from_columns(vec![
        ("x", Column::from(vec![1, 1, 2])),
        ("y", Column::from(vec![10, 20, 30])),
    ])
    .unwrap();
    let grouped = GroupedTable::from_source(table, &["x"], GroupOptions::default()).unwrap();
    let out = mutate(&grouped, &[("r".to_string(), call("min_rank", vec![col("y")]))]).unwrap();
    assert_eq!(out.group_vars(), &["x".to_string()]);
    assert_eq!(out.table().column("r").unwrap().values(), ints(&[1, 2, 1]).as_slice());
}

#[test]
fn test_registry_pipeline() {
    let registry = VerbRegistry::with_defaults();
    let table = GroupedTable::plain(
        Table::from_columns(vec![
            ("team", Column::from(vec!["a", "a", "b", "b", "b"])),
            ("score", Column::from(vec![5, 9, 7, 7, 1])),
        ])
        .unwrap(),
    );

    let grouped = registry
        .call(&table, &VerbCall::new("group_by").arg(Arg::new(col("team"))))
        .unwrap();
    let kept = registry
        .call(
            &grouped,
            &VerbCall::new("filter").arg(Arg::new(col("score").gt(call("min", vec![col("score")])))),
        )
        .unwrap();
    assert_eq!(kept.table().column("score").unwrap().values(), ints(&[9, 7, 7]).as_slice());
    assert_eq!(kept.grouping_kind(), GroupingKind::Grouped);

    let summary = registry
        .call(
            &kept,
            &VerbCall::new("summarise")
                .arg(Arg::named("n", call("n", vec![])))
                .arg(Arg::named("best", call("max", vec![col("score")]))),
        )
        .unwrap();
    assert_eq!(summary.grouping_kind(), GroupingKind::Plain);
    assert_eq!(summary.table().column("n").unwrap().values(), ints(&[1, 2]).as_slice());
    assert_eq!(summary.table().column("best").unwrap().values(), ints(&[9, 7]).as_slice());
}

#[test]
fn test_rowwise_summarise_keeps_rows() {
    let registry = VerbRegistry::with_defaults();
    let table = GroupedTable::plain(
        Table::from_columns(vec![("id", Column::from(vec![1, 2])), ("v", Column::from(vec![3, 4]))]).unwrap(),
    );
    let rowwise = registry
        .call(&table, &VerbCall::new("rowwise").arg(Arg::new(col("id"))))
        .unwrap();
    assert_eq!(rowwise.summary().as_deref(), Some("Rowwise: id [2]"));

    let out = registry
        .call(
            &rowwise,
            &VerbCall::new("summarise").arg(Arg::named("twice", col("v") * lit(2))),
        )
        .unwrap();
    assert_eq!(out.grouping_kind(), GroupingKind::Grouped);
    assert_eq!(out.table().column("twice").unwrap().values(), ints(&[6, 8]).as_slice());
}

#[test]
fn test_unknown_verb_names_the_kind() {
    let registry = VerbRegistry::with_defaults();
    match registry.call(&left(), &VerbCall::new("pivot_longer")) {
        Err(TidyError::UnknownVerb { verb, kind }) => {
            assert_eq!(verb, "pivot_longer");
            assert_eq!(kind, "plain");
        }
        other => panic!("expected UnknownVerb, got {:?}", other.map(|t| t.nrows())),
    }
}
