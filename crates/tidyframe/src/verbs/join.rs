//! Group-aware joins.
//!
//! Every join keeps the grouping of the left table: the result is passed
//! through [`GroupedTable::reconstruct`] with the left table as source.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::group::GroupedTable;
use crate::table::merge::{key_columns, key_index};
use crate::table::{Column, JoinHow, KeyOutput, MergeSpec, Table, Value, match_flags, merge};

/// How join keys are chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JoinBy {
    /// Every column name the two tables share, in left order.
    #[default]
    Infer,
    /// Same-named key columns. An empty list is a cross join.
    Columns(Vec<String>),
    /// `(left, right)` key pairs.
    Mapping(Vec<(String, String)>),
}

impl JoinBy {
    pub fn columns<S: AsRef<str>>(names: &[S]) -> Self {
        JoinBy::Columns(names.iter().map(|s| s.as_ref().to_string()).collect())
    }

    pub fn mapping<S: AsRef<str>>(pairs: &[(S, S)]) -> Self {
        JoinBy::Mapping(
            pairs
                .iter()
                .map(|(l, r)| (l.as_ref().to_string(), r.as_ref().to_string()))
                .collect(),
        )
    }

    fn resolve(&self, left: &Table, right: &Table) -> Result<(Vec<String>, Vec<String>)> {
        match self {
            JoinBy::Infer => {
                let common: Vec<String> = left
                    .column_names()
                    .into_iter()
                    .filter(|n| right.has_column(n))
                    .map(str::to_string)
                    .collect();
                if common.is_empty() {
                    return Err(TidyError::AmbiguousKey);
                }
                debug!("joining by [{}]", common.join(", "));
                Ok((common.clone(), common))
            }
            JoinBy::Columns(names) => Ok((names.clone(), names.clone())),
            JoinBy::Mapping(pairs) => Ok(pairs.iter().cloned().unzip()),
        }
    }
}

/// Options shared by the join verbs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOptions {
    /// Suffixes for non-key columns present on both sides.
    pub suffix: (String, String),
    /// Keep both sides' key columns.
    pub keep: bool,
    /// Name of the nested column added by [`nest_join`].
    pub name: Option<String>,
}

impl Default for JoinOptions {
    fn default() -> Self {
        Self {
            suffix: ("_x".to_string(), "_y".to_string()),
            keep: false,
            name: None,
        }
    }
}

/// Default name of the column added by [`nest_join`].
pub const NEST_COLUMN: &str = "_y_joined";

fn mutating_join(
    x: &GroupedTable,
    y: &GroupedTable,
    by: &JoinBy,
    options: &JoinOptions,
    how: JoinHow,
) -> Result<GroupedTable> {
    let (left_on, right_on) = by.resolve(x.table(), y.table())?;
    let how = if left_on.is_empty() { JoinHow::Cross } else { how };
    let spec = MergeSpec {
        left_on: &left_on,
        right_on: &right_on,
        how,
        suffix: (&options.suffix.0, &options.suffix.1),
        keys: if options.keep {
            KeyOutput::KeepBoth
        } else {
            KeyOutput::Coalesce
        },
    };
    let merged = merge(x.table(), y.table(), &spec)?;
    debug!(
        "{:?} join: {} x {} rows -> {} rows",
        how,
        x.nrows(),
        y.nrows(),
        merged.nrows()
    );
    Ok(GroupedTable::reconstruct(x, merged))
}

/// Rows with a match on both sides.
pub fn inner_join(x: &GroupedTable, y: &GroupedTable, by: &JoinBy, options: &JoinOptions) -> Result<GroupedTable> {
    mutating_join(x, y, by, options, JoinHow::Inner)
}

/// Every left row, with right columns missing where nothing matched.
pub fn left_join(x: &GroupedTable, y: &GroupedTable, by: &JoinBy, options: &JoinOptions) -> Result<GroupedTable> {
    mutating_join(x, y, by, options, JoinHow::Left)
}

/// Every right row, in right-table order.
pub fn right_join(x: &GroupedTable, y: &GroupedTable, by: &JoinBy, options: &JoinOptions) -> Result<GroupedTable> {
    mutating_join(x, y, by, options, JoinHow::Right)
}

/// Left-join rows followed by the right rows that matched nothing.
pub fn full_join(x: &GroupedTable, y: &GroupedTable, by: &JoinBy, options: &JoinOptions) -> Result<GroupedTable> {
    mutating_join(x, y, by, options, JoinHow::Full)
}

fn filtering_join(x: &GroupedTable, y: &GroupedTable, by: &JoinBy, keep_matches: bool) -> Result<GroupedTable> {
    let (left_on, right_on) = by.resolve(x.table(), y.table())?;
    let flags = match_flags(x.table(), y.table(), &left_on, &right_on)?;
    let mask: Vec<bool> = flags.into_iter().map(|m| m == keep_matches).collect();
    let filtered = x.table().filter(&mask)?;
    debug!(
        "{} join: kept {} of {} rows",
        if keep_matches { "semi" } else { "anti" },
        filtered.nrows(),
        x.nrows()
    );
    Ok(GroupedTable::reconstruct(x, filtered))
}

/// Left rows with at least one match, left columns only.
pub fn semi_join(x: &GroupedTable, y: &GroupedTable, by: &JoinBy) -> Result<GroupedTable> {
    filtering_join(x, y, by, true)
}

/// Left rows without a match, left columns only.
pub fn anti_join(x: &GroupedTable, y: &GroupedTable, by: &JoinBy) -> Result<GroupedTable> {
    filtering_join(x, y, by, false)
}

/// Every left row plus one column holding the matching right rows as a
/// nested table.
pub fn nest_join(x: &GroupedTable, y: &GroupedTable, by: &JoinBy, options: &JoinOptions) -> Result<GroupedTable> {
    let (left_on, right_on) = by.resolve(x.table(), y.table())?;
    let name = options.name.as_deref().unwrap_or(NEST_COLUMN);
    if x.table().has_column(name) {
        return Err(TidyError::DuplicateColumn(name.to_string()));
    }

    let inner = if options.keep {
        y.table().clone()
    } else {
        y.table().drop_columns(&right_on)
    };
    let index = key_index(y.table(), &right_on)?;
    let left_keys = key_columns(x.table(), &left_on)?;
    let nested: Vec<Value> = (0..x.nrows())
        .map(|row| {
            let rows = index
                .get(&Table::row_key(&left_keys, row))
                .map(Vec::as_slice)
                .unwrap_or_default();
            Value::from(inner.take(rows))
        })
        .collect();

    let out = x.table().clone().with_column(name, Column::new(nested))?;
    Ok(GroupedTable::reconstruct(x, out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{GroupOptions, GroupingKind};

    fn x() -> GroupedTable {
        let t = Table::from_columns(vec![
            ("a", Column::from(vec![1, 2, 3])),
            ("b", Column::from(vec!["p", "q", "r"])),
        ])
        .unwrap();
        GroupedTable::from_source(t, &["b"], GroupOptions::default()).unwrap()
    }

    fn y() -> GroupedTable {
        GroupedTable::plain(
            Table::from_columns(vec![
                ("a", Column::from(vec![2, 3, 4])),
                ("c", Column::from(vec![20, 30, 40])),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_inner_join_keeps_left_grouping() {
        let out = inner_join(&x(), &y(), &JoinBy::Infer, &JoinOptions::default()).unwrap();
        assert_eq!(out.nrows(), 2);
        assert_eq!(out.group_vars(), &["b".to_string()]);
        assert_eq!(out.table().column_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_infer_without_common_columns() {
        let other = GroupedTable::plain(Table::from_columns(vec![("z", Column::from(vec![1]))]).unwrap());
        assert!(matches!(
            left_join(&x(), &other, &JoinBy::Infer, &JoinOptions::default()),
            Err(TidyError::AmbiguousKey)
        ));
    }

    #[test]
    fn test_anti_and_semi() {
        let anti = anti_join(&x(), &y(), &JoinBy::columns(&["a"])).unwrap();
        assert_eq!(anti.table().column("a").unwrap().values(), &[Value::from(1)]);
        let semi = semi_join(&x(), &y(), &JoinBy::columns(&["a"])).unwrap();
        assert_eq!(semi.nrows(), 2);
        assert_eq!(semi.grouping_kind(), GroupingKind::Grouped);
    }

    #[test]
    fn test_mapping_coalesces_right_only_keys() {
        let right = GroupedTable::plain(
            Table::from_columns(vec![
                ("k", Column::from(vec![3, 9])),
                ("c", Column::from(vec![30, 90])),
            ])
            .unwrap(),
        );
        let out = full_join(&x(), &right, &JoinBy::mapping(&[("a", "k")]), &JoinOptions::default()).unwrap();
        assert_eq!(out.table().column_names(), vec!["a", "b", "c"]);
        assert_eq!(
            out.table().column("a").unwrap().values(),
            &[Value::from(1), Value::from(2), Value::from(3), Value::from(9)]
        );
    }

    #[test]
    fn test_keep_suffixes_same_named_keys() {
        let options = JoinOptions {
            keep: true,
            ..JoinOptions::default()
        };
        let out = left_join(&x(), &y(), &JoinBy::columns(&["a"]), &options).unwrap();
        assert_eq!(out.table().column_names(), vec!["a_x", "b", "a_y", "c"]);
    }

    #[test]
    fn test_empty_by_is_cross_join() {
        let out = inner_join(&x(), &y(), &JoinBy::Columns(Vec::new()), &JoinOptions::default()).unwrap();
        assert_eq!(out.nrows(), 9);
        assert_eq!(out.table().column_names(), vec!["a_x", "b", "a_y", "c"]);
    }

    #[test]
    fn test_nest_join() {
        let out = nest_join(&x(), &y(), &JoinBy::Infer, &JoinOptions::default()).unwrap();
        let nested = out.table().column(NEST_COLUMN).unwrap();
        match &nested.values()[1] {
            Value::Table(t) => {
                assert_eq!(t.nrows(), 1);
                assert_eq!(t.column_names(), vec!["c"]);
            }
            other => panic!("expected a nested table, got {}", other),
        }
        match &nested.values()[0] {
            Value::Table(t) => assert_eq!(t.nrows(), 0),
            other => panic!("expected a nested table, got {}", other),
        }
    }

    #[test]
    fn test_missing_key_column() {
        assert!(matches!(
            inner_join(&x(), &y(), &JoinBy::columns(&["zz"]), &JoinOptions::default()),
            Err(TidyError::UnknownColumn(_))
        ));
    }
}
