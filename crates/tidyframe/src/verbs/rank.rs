//! Rank-family kernels.
//!
//! Each kernel is written once over a slice of values. Grouped input runs
//! the kernel per group and reassembles the result in row order, so output
//! always has one entry per input row.

use crate::error::{Result, TidyError};
use crate::eval::GroupedColumn;
use crate::group::{GroupIndex, GroupedTable, GroupingKind};
use crate::table::rank::rank_keys;
use crate::table::{NaOption, RankMethod, Value};

/// What a rank kernel ranks.
#[derive(Debug, Clone, Copy)]
pub enum RankInput<'a> {
    /// A flat sequence.
    Values(&'a [Value]),
    /// A column evaluated against grouped rows; ranks restart per group.
    Grouped(&'a GroupedColumn),
    /// A table; only meaningful for [`row_number`].
    Table(&'a GroupedTable),
}

fn apply<F>(input: RankInput<'_>, name: &str, kernel: F) -> Result<Vec<Value>>
where
    F: Fn(&[Value]) -> Result<Vec<Value>>,
{
    match input {
        RankInput::Values(values) => kernel(values),
        RankInput::Grouped(column) => Ok(column.map_groups(kernel)?.into_values()),
        RankInput::Table(_) => Err(TidyError::InvalidArgument(format!(
            "{}() needs a column to rank, not a table",
            name
        ))),
    }
}

/// Row numbers. For a sequence this ranks values with ties broken by
/// position; for a table it numbers rows within their group.
pub fn row_number(input: RankInput<'_>) -> Result<Vec<Value>> {
    match input {
        RankInput::Table(table) => Ok(match table.grouping_kind() {
            GroupingKind::Plain => positions(table.nrows()),
            GroupingKind::Grouped | GroupingKind::RowWise => group_positions(&table.index()),
        }),
        other => apply(other, "row_number", row_number_values),
    }
}

pub fn min_rank(input: RankInput<'_>) -> Result<Vec<Value>> {
    apply(input, "min_rank", min_rank_values)
}

pub fn rank(input: RankInput<'_>, method: RankMethod, na: NaOption) -> Result<Vec<Value>> {
    apply(input, "rank", |values| rank_values(values, method, na))
}

/// Split values into at most `n` buckets labelled from 0.
pub fn ntile(input: RankInput<'_>, n: i64) -> Result<Vec<Value>> {
    apply(input, "ntile", |values| ntile_values(values, n))
}

pub fn percent_rank(input: RankInput<'_>) -> Result<Vec<Value>> {
    apply(input, "percent_rank", percent_rank_values)
}

pub fn cume_dist(input: RankInput<'_>) -> Result<Vec<Value>> {
    apply(input, "cume_dist", cume_dist_values)
}

/// `1..=n` as integer values.
pub(crate) fn positions(n: usize) -> Vec<Value> {
    (1..=n as i64).map(Value::Int).collect()
}

/// Position of each row within its group; missing for ungrouped rows.
pub(crate) fn group_positions(index: &GroupIndex) -> Vec<Value> {
    let mut out = vec![Value::Null; index.nrows()];
    for rows in index.rows() {
        for (pos, &row) in rows.iter().enumerate() {
            out[row] = Value::Int(pos as i64 + 1);
        }
    }
    out
}

fn numeric_keys(values: &[Value], context: &str) -> Result<Vec<Option<f64>>> {
    values.iter().map(|v| v.numeric(context)).collect()
}

fn int_ranks(ranks: Vec<Option<f64>>) -> Vec<Value> {
    ranks
        .into_iter()
        .map(|r| r.map(|r| Value::Int(r as i64)).unwrap_or_default())
        .collect()
}

pub(crate) fn row_number_values(values: &[Value]) -> Result<Vec<Value>> {
    let keys = numeric_keys(values, "row_number")?;
    Ok(int_ranks(rank_keys(&keys, RankMethod::First, NaOption::Keep)))
}

pub(crate) fn min_rank_values(values: &[Value]) -> Result<Vec<Value>> {
    let keys = numeric_keys(values, "min_rank")?;
    Ok(int_ranks(rank_keys(&keys, RankMethod::Min, NaOption::Keep)))
}

pub(crate) fn rank_values(values: &[Value], method: RankMethod, na: NaOption) -> Result<Vec<Value>> {
    let keys = numeric_keys(values, "rank")?;
    let ranks = rank_keys(&keys, method, na);
    if method == RankMethod::Average {
        return Ok(ranks.into_iter().map(Value::from).collect());
    }
    Ok(int_ranks(ranks))
}

pub(crate) fn ntile_values(values: &[Value], n: i64) -> Result<Vec<Value>> {
    if n < 1 {
        return Err(TidyError::InvalidArgument(format!(
            "ntile() needs at least one bucket, got {}",
            n
        )));
    }
    let keys = numeric_keys(values, "ntile")?;
    let mut present: Vec<usize> = (0..keys.len()).filter(|&i| keys[i].is_some()).collect();
    present.sort_by(|&a, &b| {
        let (ka, kb) = (keys[a].unwrap_or_default(), keys[b].unwrap_or_default());
        ka.total_cmp(&kb).then(a.cmp(&b))
    });

    let mut distinct = present.iter().filter_map(|&i| keys[i]).collect::<Vec<_>>();
    distinct.dedup();
    let buckets = (n as usize).min(distinct.len());

    let mut out = vec![Value::Null; values.len()];
    if buckets == 0 {
        return Ok(out);
    }
    let base = present.len() / buckets;
    let extra = present.len() % buckets;
    let mut slot = 0;
    for bucket in 0..buckets {
        let size = base + usize::from(bucket < extra);
        for &pos in &present[slot..slot + size] {
            out[pos] = Value::Int(bucket as i64);
        }
        slot += size;
    }
    Ok(out)
}

pub(crate) fn percent_rank_values(values: &[Value]) -> Result<Vec<Value>> {
    let keys = numeric_keys(values, "percent_rank")?;
    let ranks = rank_keys(&keys, RankMethod::Min, NaOption::Keep);
    let present: Vec<f64> = ranks.iter().flatten().copied().collect();
    let lo = present.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(ranks
        .into_iter()
        .map(|r| match r {
            // A single ranked value divides 0 by 0.
            Some(r) => Value::float((r - lo) / (hi - lo)),
            None => Value::Null,
        })
        .collect())
}

pub(crate) fn cume_dist_values(values: &[Value]) -> Result<Vec<Value>> {
    let keys = numeric_keys(values, "cume_dist")?;
    let ranks = rank_keys(&keys, RankMethod::Min, NaOption::Keep);
    let total = values.len() as f64;
    let mut sorted: Vec<f64> = ranks.iter().flatten().copied().collect();
    sorted.sort_by(f64::total_cmp);
    Ok(ranks
        .iter()
        .map(|r| match r {
            Some(r) => {
                let at_most = sorted.partition_point(|other| other <= r);
                Value::float(at_most as f64 / total)
            }
            None => Value::Null,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::group::GroupOptions;
    use crate::table::{Column, Table};

    fn ints(xs: &[i64]) -> Vec<Value> {
        xs.iter().map(|&x| Value::from(x)).collect()
    }

    fn floats(values: &[Value]) -> Vec<Option<f64>> {
        values.iter().map(Value::as_f64).collect()
    }

    #[test]
    fn test_ntile_buckets() {
        let out = ntile(RankInput::Values(&ints(&[1, 2, 3, 4, 5, 6, 7])), 3).unwrap();
        assert_eq!(out, ints(&[0, 0, 0, 1, 1, 2, 2]));
    }

    #[test]
    fn test_ntile_caps_at_distinct_values() {
        let out = ntile(RankInput::Values(&ints(&[5, 5, 5])), 4).unwrap();
        assert_eq!(out, ints(&[0, 0, 0]));
        let empty: Vec<Value> = Vec::new();
        assert!(ntile(RankInput::Values(&empty), 2).unwrap().is_empty());
        assert!(matches!(
            ntile(RankInput::Values(&ints(&[1])), 0),
            Err(TidyError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_percent_rank() {
        let out = percent_rank(RankInput::Values(&ints(&[1, 2, 3, 4]))).unwrap();
        let got = floats(&out);
        let want = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0];
        for (g, w) in got.iter().zip(want) {
            assert!((g.unwrap() - w).abs() < 1e-12);
        }
        let single = percent_rank(RankInput::Values(&ints(&[9]))).unwrap();
        assert!(single[0].as_f64().unwrap().is_nan());
    }

    #[test]
    fn test_cume_dist_counts_missing_in_denominator() {
        let values = vec![Value::from(1), Value::Null, Value::from(2), Value::from(2)];
        let out = cume_dist(RankInput::Values(&values)).unwrap();
        assert_eq!(
            out,
            vec![Value::float(0.25), Value::Null, Value::float(0.75), Value::float(0.75)]
        );
    }

    #[test]
    fn test_cume_dist_unsorted_with_ties() {
        let values = vec![Value::from(3), Value::Null, Value::from(1), Value::from(3), Value::from(2)];
        let out = cume_dist(RankInput::Values(&values)).unwrap();
        assert_eq!(
            out,
            vec![
                Value::float(0.8),
                Value::Null,
                Value::float(0.2),
                Value::float(0.8),
                Value::float(0.4)
            ]
        );
    }

    #[test]
    fn test_row_number_on_tables() {
        let table = Table::from_columns(vec![("g", Column::from(vec!["a", "b", "a"]))]).unwrap();
        let plain = GroupedTable::plain(table.clone());
        assert_eq!(row_number(RankInput::Table(&plain)).unwrap(), ints(&[1, 2, 3]));
        let grouped = GroupedTable::from_source(table, &["g"], GroupOptions::default()).unwrap();
        assert_eq!(row_number(RankInput::Table(&grouped)).unwrap(), ints(&[1, 1, 2]));
        assert!(min_rank(RankInput::Table(&grouped)).is_err());
    }

    #[test]
    fn test_grouped_ranks_restart() {
        let table = Table::from_columns(vec![("g", Column::from(vec!["a", "b", "a"]))]).unwrap();
        let index = GroupIndex::build(&table, &["g"], &GroupOptions::default()).unwrap();
        let column = GroupedColumn::new(ints(&[30, 10, 20]), Arc::new(index)).unwrap();
        assert_eq!(min_rank(RankInput::Grouped(&column)).unwrap(), ints(&[2, 1, 1]));
    }

    #[test]
    fn test_row_number_keeps_missing() {
        let values = vec![Value::from(3), Value::Null, Value::from(3)];
        assert_eq!(
            row_number(RankInput::Values(&values)).unwrap(),
            vec![Value::from(1), Value::Null, Value::from(2)]
        );
    }

    #[test]
    fn test_rank_rejects_strings() {
        let values = vec![Value::from("a")];
        assert!(matches!(
            rank(RankInput::Values(&values), RankMethod::Min, NaOption::Keep),
            Err(TidyError::TypeMismatch { .. })
        ));
    }
}
