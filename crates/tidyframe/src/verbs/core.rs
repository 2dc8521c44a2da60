//! Grouping, selection, mutation, filtering and summaries.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::eval::{EvalContext, Evaluator, Expr};
use crate::group::{GroupOptions, GroupedTable, GroupingKind};
use crate::table::{Column, Table, Value};

/// Group a table by the named columns. With `add`, the names are appended
/// to the existing grouping instead of replacing it.
pub fn group_by<S: AsRef<str>>(
    table: &GroupedTable,
    columns: &[S],
    add: bool,
    options: GroupOptions,
) -> Result<GroupedTable> {
    let mut vars: Vec<String> = Vec::new();
    if add && table.grouping_kind() == GroupingKind::Grouped {
        vars.extend(table.group_vars().iter().cloned());
    }
    vars.extend(columns.iter().map(|c| c.as_ref().to_string()));
    GroupedTable::from_source(table.shared_table(), &vars, options)
}

/// Make every row its own group.
///
/// A grouped table without explicit columns keeps its group variables as
/// the row-wise variables.
pub fn rowwise<S: AsRef<str>>(table: &GroupedTable, columns: &[S]) -> Result<GroupedTable> {
    match table.grouping_kind() {
        GroupingKind::Grouped if columns.is_empty() => {
            GroupedTable::as_rowwise(table.shared_table(), table.group_vars())
        }
        GroupingKind::Grouped => Err(TidyError::InvalidArgument(
            "can't re-group a grouped table row-wise by new columns; ungroup it first".to_string(),
        )),
        _ => GroupedTable::as_rowwise(table.shared_table(), columns),
    }
}

pub fn ungroup(table: &GroupedTable) -> GroupedTable {
    table.ungroup()
}

/// One argument to [`select`]: the columns it matched, plus an optional
/// new name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub names: Vec<String>,
    pub rename: Option<String>,
}

impl Selection {
    pub fn new(names: Vec<String>) -> Self {
        Self { names, rename: None }
    }

    pub fn renamed(names: Vec<String>, rename: &str) -> Self {
        Self {
            names,
            rename: Some(rename.to_string()),
        }
    }
}

/// Keep (and optionally rename) columns.
///
/// A renamed selection matching one column gives it the new name; one
/// matching several numbers them (`name1`, `name2`, ...). Group variables
/// follow renames; dropping every group variable leaves a plain table.
pub fn select(table: &GroupedTable, selections: &[Selection]) -> Result<GroupedTable> {
    let mut picked: Vec<(String, String)> = Vec::new();
    for selection in selections {
        let many = selection.names.len() > 1;
        for (i, name) in selection.names.iter().enumerate() {
            let new_name = match &selection.rename {
                Some(rename) if many => format!("{}{}", rename, i + 1),
                Some(rename) => rename.clone(),
                None => name.clone(),
            };
            match picked.iter_mut().find(|(old, _)| old == name) {
                Some(entry) if selection.rename.is_some() => entry.1 = new_name,
                Some(_) => {}
                None => picked.push((name.clone(), new_name)),
            }
        }
    }

    let olds: Vec<&str> = picked.iter().map(|(old, _)| old.as_str()).collect();
    let renames: Vec<(&str, &str)> = picked
        .iter()
        .filter(|(old, new)| old != new)
        .map(|(old, new)| (old.as_str(), new.as_str()))
        .collect();
    let out = table.table().select(&olds)?.rename(&renames)?;

    let vars: Vec<String> = table
        .group_vars()
        .iter()
        .filter_map(|v| picked.iter().find(|(old, _)| old == v).map(|(_, new)| new.clone()))
        .collect();
    if vars.len() != table.group_vars().len() {
        debug!(
            "select dropped group variables: [{}] -> [{}]",
            table.group_vars().join(", "),
            vars.join(", ")
        );
    }

    let kind = match table.grouping_kind() {
        GroupingKind::Grouped if vars.is_empty() => GroupingKind::Plain,
        kind => kind,
    };
    // The rows are unchanged, so the partition survives as long as every
    // grouping column does.
    let index = match kind {
        GroupingKind::Grouped if vars.len() != table.group_vars().len() => None,
        GroupingKind::Plain => None,
        _ => Some(table.index()),
    };
    let vars = if kind == GroupingKind::Plain { Vec::new() } else { vars };
    Ok(GroupedTable::from_parts(
        Arc::new(out),
        kind,
        vars,
        *table.options(),
        index,
    ))
}

/// Add or replace columns, evaluated per group.
///
/// Assignments apply in order, so later expressions see earlier results.
pub fn mutate(table: &GroupedTable, assignments: &[(String, Expr)]) -> Result<GroupedTable> {
    let evaluator = Evaluator::new();
    let mut current = table.clone();
    for (name, expr) in assignments {
        let values = evaluator.resolve_rows(expr, EvalContext::PerGroup, &current)?;
        let updated = current.table().clone().with_column(name.clone(), Column::new(values))?;
        current = if current.group_vars().iter().any(|v| v == name) {
            debug!("mutate overwrote group variable '{}'; regrouping", name);
            GroupedTable::reconstruct(&current, updated)
        } else {
            current.with_table_keeping_index(updated)
        };
    }
    Ok(GroupedTable::reconstruct(&current, current.shared_table()))
}

/// Keep rows where every predicate holds. Missing counts as false.
pub fn filter(table: &GroupedTable, predicates: &[Expr]) -> Result<GroupedTable> {
    let evaluator = Evaluator::new();
    let mut mask = vec![true; table.nrows()];
    for predicate in predicates {
        let values = evaluator.resolve_rows(predicate, EvalContext::PerGroup, table)?;
        for (keep, value) in mask.iter_mut().zip(&values) {
            match value {
                Value::Bool(b) => *keep &= *b,
                Value::Null => *keep = false,
                other => {
                    return Err(TidyError::type_mismatch("filter", "boolean", other.type_name()));
                }
            }
        }
    }
    let filtered = table.table().filter(&mask)?;
    debug!("filter: kept {} of {} rows", filtered.nrows(), table.nrows());
    Ok(GroupedTable::reconstruct(table, filtered))
}

/// Grouping of a summary's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummariseGroups {
    /// Drop the last group variable.
    #[default]
    DropLast,
    /// No grouping.
    Drop,
    /// Keep every group variable.
    Keep,
}

impl std::str::FromStr for SummariseGroups {
    type Err = TidyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "drop_last" => Ok(SummariseGroups::DropLast),
            "drop" => Ok(SummariseGroups::Drop),
            "keep" => Ok(SummariseGroups::Keep),
            other => Err(TidyError::InvalidArgument(format!(
                "unknown summarise grouping '{}'",
                other
            ))),
        }
    }
}

/// One row per group: the group keys followed by one column per summary.
///
/// Every expression sees the input columns, not earlier summaries.
pub fn summarise(
    table: &GroupedTable,
    summaries: &[(String, Expr)],
    groups: SummariseGroups,
) -> Result<GroupedTable> {
    let evaluator = Evaluator::new();
    let mut out = match table.grouping_kind() {
        GroupingKind::Plain => Table::new(),
        _ => table.group_keys()?,
    };
    let n_groups = table.n_groups();
    for (name, expr) in summaries {
        if out.has_column(name) {
            return Err(TidyError::DuplicateColumn(name.clone()));
        }
        let values = evaluator.resolve_groups(expr, table)?;
        if values.len() != n_groups {
            return Err(TidyError::LengthMismatch {
                column: name.clone(),
                expected: n_groups,
                actual: values.len(),
            });
        }
        out = out.with_column(name.clone(), Column::new(values))?;
    }

    let vars = table.group_vars();
    let keep: &[String] = match (table.grouping_kind(), groups) {
        (GroupingKind::Plain, _) | (_, SummariseGroups::Drop) => &[],
        (GroupingKind::RowWise, _) | (_, SummariseGroups::Keep) => vars,
        (GroupingKind::Grouped, SummariseGroups::DropLast) => &vars[..vars.len().saturating_sub(1)],
    };
    debug!(
        "summarise: {} groups, output grouped by [{}]",
        n_groups,
        keep.join(", ")
    );
    GroupedTable::from_source(out, keep, *table.options())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{call, col, lit};

    fn sample() -> Table {
        Table::from_columns(vec![
            ("g", Column::from(vec!["a", "a", "b"])),
            ("h", Column::from(vec![1, 2, 1])),
            ("x", Column::from(vec![3, 1, 2])),
        ])
        .unwrap()
    }

    fn grouped(vars: &[&str]) -> GroupedTable {
        GroupedTable::from_source(sample(), vars, GroupOptions::default()).unwrap()
    }

    fn ints(xs: &[i64]) -> Vec<Value> {
        xs.iter().map(|&x| Value::from(x)).collect()
    }

    #[test]
    fn test_group_by_add() {
        let g = grouped(&["g"]);
        let added = group_by(&g, &["h"], true, GroupOptions::default()).unwrap();
        assert_eq!(added.group_vars(), &["g".to_string(), "h".to_string()]);
        let replaced = group_by(&g, &["h"], false, GroupOptions::default()).unwrap();
        assert_eq!(replaced.group_vars(), &["h".to_string()]);
    }

    #[test]
    fn test_rowwise_from_grouped() {
        let rw = rowwise::<&str>(&grouped(&["g"]), &[]).unwrap();
        assert_eq!(rw.grouping_kind(), GroupingKind::RowWise);
        assert_eq!(rw.group_vars(), &["g".to_string()]);
        assert!(rowwise(&grouped(&["g"]), &["x"]).is_err());
    }

    #[test]
    fn test_select_renames_group_vars() {
        let g = grouped(&["g"]);
        let out = select(
            &g,
            &[Selection::renamed(vec!["g".into()], "group"), Selection::new(vec!["x".into()])],
        )
        .unwrap();
        assert_eq!(out.table().column_names(), vec!["group", "x"]);
        assert_eq!(out.group_vars(), &["group".to_string()]);
        assert!(Arc::ptr_eq(&out.index(), &g.index()));

        let demoted = select(&g, &[Selection::new(vec!["x".into()])]).unwrap();
        assert_eq!(demoted.grouping_kind(), GroupingKind::Plain);
    }

    #[test]
    fn test_mutate_sequential_per_group() {
        let out = mutate(
            &grouped(&["g"]),
            &[
                ("r".to_string(), call("min_rank", vec![col("x")])),
                ("r2".to_string(), col("r") * lit(10)),
            ],
        )
        .unwrap();
        assert_eq!(out.table().column("r").unwrap().values(), &ints(&[2, 1, 1])[..]);
        assert_eq!(out.table().column("r2").unwrap().values(), &ints(&[20, 10, 10])[..]);
        assert_eq!(out.group_vars(), &["g".to_string()]);
    }

    #[test]
    fn test_mutate_overwriting_group_var_regroups() {
        let out = mutate(&grouped(&["h"]), &[("h".to_string(), lit(7))]).unwrap();
        assert_eq!(out.n_groups(), 1);
    }

    #[test]
    fn test_filter_per_group() {
        let expr = col("x").eq(call("max", vec![col("x")]));
        let out = filter(&grouped(&["g"]), &[expr]).unwrap();
        assert_eq!(out.table().column("x").unwrap().values(), &ints(&[3, 2])[..]);
        assert!(matches!(
            filter(&grouped(&["g"]), &[col("x")]),
            Err(TidyError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_summarise_grouping_policies() {
        let two = grouped(&["g", "h"]);
        let summary = vec![("total".to_string(), call("sum", vec![col("x")]))];
        let out = summarise(&two, &summary, SummariseGroups::default()).unwrap();
        assert_eq!(out.table().column_names(), vec!["g", "h", "total"]);
        assert_eq!(out.group_vars(), &["g".to_string()]);
        assert_eq!(out.nrows(), 3);

        let one = summarise(&grouped(&["g"]), &summary, SummariseGroups::DropLast).unwrap();
        assert_eq!(one.grouping_kind(), GroupingKind::Plain);
        assert_eq!(one.table().column("total").unwrap().values(), &ints(&[4, 2])[..]);

        let plain = summarise(&GroupedTable::plain(sample()), &summary, SummariseGroups::Keep).unwrap();
        assert_eq!(plain.nrows(), 1);
        assert_eq!(plain.table().column("total").unwrap().values(), &ints(&[6])[..]);
    }

    #[test]
    fn test_summarise_rejects_window_results() {
        let summary = vec![("r".to_string(), call("min_rank", vec![col("x")]))];
        assert!(matches!(
            summarise(&grouped(&["g"]), &summary, SummariseGroups::Drop),
            Err(TidyError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_summarise_rowwise_keeps_vars() {
        let rw = GroupedTable::as_rowwise(sample(), &["g"]).unwrap();
        let summary = vec![("y".to_string(), col("x") + lit(1))];
        let out = summarise(&rw, &summary, SummariseGroups::DropLast).unwrap();
        assert_eq!(out.grouping_kind(), GroupingKind::Grouped);
        assert_eq!(out.table().column_names(), vec!["g", "y"]);
        assert_eq!(out.table().column("y").unwrap().values(), &ints(&[4, 2, 3])[..]);
    }
}
