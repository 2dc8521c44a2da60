//! Hash-join primitive over plain tables.
//!
//! This layer knows nothing about grouping. It pairs rows by key, lays out
//! the output columns and disambiguates clashing names; the join verbs in
//! [`crate::verbs::join`] decide how keys are specified and re-attach
//! grouping afterwards.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::column::Column;
use super::frame::Table;
use super::value::Value;
use crate::error::{Result, TidyError};

/// Which rows a merge emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinHow {
    /// Matching pairs only.
    Inner,
    /// Every left row.
    Left,
    /// Every right row, in right-table order.
    Right,
    /// Every row from either side.
    Full,
    /// Every left row paired with every right row.
    Cross,
}

/// How key columns appear in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOutput {
    /// One column per key, named after the left key; rows with no left match
    /// take the right key's value.
    Coalesce,
    /// Both sides' key columns are kept as ordinary columns.
    KeepBoth,
}

/// Parameters for [`merge`].
#[derive(Debug, Clone)]
pub struct MergeSpec<'a> {
    pub left_on: &'a [String],
    pub right_on: &'a [String],
    pub how: JoinHow,
    pub suffix: (&'a str, &'a str),
    pub keys: KeyOutput,
}

/// Index of right-table rows by key tuple.
pub(crate) fn key_index(table: &Table, on: &[String]) -> Result<HashMap<Vec<Value>, Vec<usize>>> {
    let columns = key_columns(table, on)?;
    let mut index: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
    for row in 0..table.nrows() {
        index.entry(Table::row_key(&columns, row)).or_default().push(row);
    }
    Ok(index)
}

pub(crate) fn key_columns<'t>(table: &'t Table, on: &[String]) -> Result<Vec<&'t Column>> {
    let missing: Vec<String> = on.iter().filter(|c| !table.has_column(c)).cloned().collect();
    if !missing.is_empty() {
        return Err(TidyError::UnknownColumn(missing));
    }
    on.iter().map(|c| table.column_required(c)).collect()
}

/// Pair up row positions. Missing keys match each other.
pub fn join_indices(
    left: &Table,
    right: &Table,
    left_on: &[String],
    right_on: &[String],
    how: JoinHow,
) -> Result<Vec<(Option<usize>, Option<usize>)>> {
    if left_on.len() != right_on.len() {
        return Err(TidyError::InvalidArgument(format!(
            "join keys differ in length: {} vs {}",
            left_on.len(),
            right_on.len()
        )));
    }

    let mut pairs = Vec::new();
    match how {
        JoinHow::Cross => {
            for l in 0..left.nrows() {
                pairs.extend((0..right.nrows()).map(|r| (Some(l), Some(r))));
            }
        }
        JoinHow::Right => {
            let index = key_index(left, left_on)?;
            let columns = key_columns(right, right_on)?;
            for r in 0..right.nrows() {
                match index.get(&Table::row_key(&columns, r)) {
                    Some(matches) => pairs.extend(matches.iter().map(|&l| (Some(l), Some(r)))),
                    None => pairs.push((None, Some(r))),
                }
            }
        }
        JoinHow::Inner | JoinHow::Left | JoinHow::Full => {
            let index = key_index(right, right_on)?;
            let columns = key_columns(left, left_on)?;
            let mut matched = vec![false; right.nrows()];
            for l in 0..left.nrows() {
                match index.get(&Table::row_key(&columns, l)) {
                    Some(matches) => {
                        for &r in matches {
                            matched[r] = true;
                            pairs.push((Some(l), Some(r)));
                        }
                    }
                    None if how != JoinHow::Inner => pairs.push((Some(l), None)),
                    None => {}
                }
            }
            if how == JoinHow::Full {
                pairs.extend(
                    matched
                        .iter()
                        .enumerate()
                        .filter(|(_, m)| !**m)
                        .map(|(r, _)| (None, Some(r))),
                );
            }
        }
    }
    Ok(pairs)
}

/// For each left row, whether at least one right row shares its key.
pub fn match_flags(left: &Table, right: &Table, left_on: &[String], right_on: &[String]) -> Result<Vec<bool>> {
    let right_columns = key_columns(right, right_on)?;
    let keys: HashSet<Vec<Value>> = (0..right.nrows())
        .map(|r| Table::row_key(&right_columns, r))
        .collect();
    let left_columns = key_columns(left, left_on)?;
    Ok((0..left.nrows())
        .map(|l| keys.contains(&Table::row_key(&left_columns, l)))
        .collect())
}

/// Join two tables.
///
/// Output columns are the left columns in order (keys in place), then the
/// right columns in order. Non-key names present on both sides get the
/// suffix pair.
pub fn merge(left: &Table, right: &Table, spec: &MergeSpec<'_>) -> Result<Table> {
    let pairs = join_indices(left, right, spec.left_on, spec.right_on, spec.how)?;
    let left_rows: Vec<Option<usize>> = pairs.iter().map(|(l, _)| *l).collect();
    let right_rows: Vec<Option<usize>> = pairs.iter().map(|(_, r)| *r).collect();

    let coalesce = spec.keys == KeyOutput::Coalesce && spec.how != JoinHow::Cross;
    let right_names: Vec<&str> = right
        .column_names()
        .into_iter()
        .filter(|n| !(coalesce && spec.right_on.iter().any(|k| k.as_str() == *n)))
        .collect();
    let left_names = left.column_names();
    let clashes: HashSet<&str> = left_names
        .iter()
        .copied()
        .filter(|n| right_names.contains(n))
        .collect();

    let mut columns: Vec<(String, Column)> = Vec::with_capacity(left_names.len() + right_names.len());
    for (name, column) in left.columns() {
        let key_pos = spec.left_on.iter().position(|k| k == name);
        let out = match key_pos {
            Some(i) if coalesce => {
                let right_key = right.column_required(&spec.right_on[i])?;
                coalesce_key(column, right_key, &pairs)?
            }
            _ => column.take_optional(&left_rows),
        };
        columns.push((suffixed(name, spec.suffix.0, &clashes), out));
    }
    for name in right_names {
        let column = right.column_required(name)?;
        columns.push((suffixed(name, spec.suffix.1, &clashes), column.take_optional(&right_rows)));
    }

    Table::from_columns(columns)
}

fn suffixed(name: &str, suffix: &str, clashes: &HashSet<&str>) -> String {
    if clashes.contains(name) {
        format!("{}{}", name, suffix)
    } else {
        name.to_string()
    }
}

fn coalesce_key(left: &Column, right: &Column, pairs: &[(Option<usize>, Option<usize>)]) -> Result<Column> {
    let values = pairs
        .iter()
        .map(|(l, r)| match (l, r) {
            (Some(l), _) => left.values()[*l].clone(),
            (None, Some(r)) => right.values()[*r].clone(),
            (None, None) => Value::Null,
        })
        .collect();
    match Column::union_levels(left, right) {
        Some(levels) => Column::categorical(values, levels),
        None => Ok(Column::new(values)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left() -> Table {
        Table::from_columns(vec![
            ("a", Column::from(vec![1, 2])),
            ("b", Column::from(vec![10, 20])),
        ])
        .unwrap()
    }

    fn right() -> Table {
        Table::from_columns(vec![
            ("a", Column::from(vec![2, 3])),
            ("b", Column::from(vec![99, 100])),
        ])
        .unwrap()
    }

    fn spec<'a>(on: &'a [String], how: JoinHow) -> MergeSpec<'a> {
        MergeSpec {
            left_on: on,
            right_on: on,
            how,
            suffix: ("_x", "_y"),
            keys: KeyOutput::Coalesce,
        }
    }

    #[test]
    fn test_full_join_appends_unmatched_right_rows() {
        let on = vec!["a".to_string()];
        let out = merge(&left(), &right(), &spec(&on, JoinHow::Full)).unwrap();
        assert_eq!(out.column_names(), vec!["a", "b_x", "b_y"]);
        assert_eq!(
            out.column("a").unwrap().values(),
            &[Value::from(1), Value::from(2), Value::from(3)]
        );
        assert_eq!(
            out.column("b_y").unwrap().values(),
            &[Value::Null, Value::from(99), Value::from(100)]
        );
    }

    #[test]
    fn test_right_join_follows_right_order() {
        let on = vec!["a".to_string()];
        let pairs = join_indices(&left(), &right(), &on, &on, JoinHow::Right).unwrap();
        assert_eq!(pairs, vec![(Some(1), Some(0)), (None, Some(1))]);
    }

    #[test]
    fn test_missing_keys_match_each_other() {
        let l = Table::from_columns(vec![("k", Column::new(vec![Value::Null]))]).unwrap();
        let r = Table::from_columns(vec![("k", Column::new(vec![Value::Null]))]).unwrap();
        let on = vec!["k".to_string()];
        assert_eq!(match_flags(&l, &r, &on, &on).unwrap(), vec![true]);
    }

    #[test]
    fn test_cross_join_pairs_everything() {
        let pairs = join_indices(&left(), &right(), &[], &[], JoinHow::Cross).unwrap();
        assert_eq!(pairs.len(), 4);
    }
}
