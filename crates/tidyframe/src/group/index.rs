//! Row partition by grouping key.

use std::cmp::Ordering;
use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TidyError};
use crate::table::{Column, Table, Value};

/// Options controlling how a group index is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOptions {
    /// Order groups by key (categorical columns by level order) instead of
    /// by first occurrence.
    pub sort: bool,
    /// Exclude rows whose key contains a missing value.
    pub dropna: bool,
    /// When false, add empty groups for unobserved categorical levels.
    pub drop: bool,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            sort: false,
            dropna: false,
            drop: true,
        }
    }
}

/// Immutable mapping between rows and groups.
///
/// Groups are numbered `0..n_groups()`. Every row belongs to at most one
/// group; rows excluded by `dropna` belong to none. Empty groups only appear
/// when built with `drop = false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupIndex {
    keys: Vec<Vec<Value>>,
    rows: Vec<Vec<usize>>,
    membership: Vec<Option<usize>>,
    lookup: HashMap<Vec<Value>, usize>,
}

impl GroupIndex {
    /// Partition the rows of `table` by the values of `group_vars`.
    pub fn build<S: AsRef<str>>(table: &Table, group_vars: &[S], options: &GroupOptions) -> Result<Self> {
        let missing: Vec<String> = group_vars
            .iter()
            .map(AsRef::as_ref)
            .filter(|v| !table.has_column(v))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(TidyError::InvalidGroupVars(missing));
        }

        let columns: Vec<&Column> = group_vars
            .iter()
            .filter_map(|v| table.column(v.as_ref()))
            .collect();
        let index = Self::partition(&columns, table.nrows(), options);
        debug!(
            "built group index over [{}]: {} groups from {} rows",
            group_vars.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", "),
            index.n_groups(),
            table.nrows()
        );
        Ok(index)
    }

    /// One singleton group per row, in row order. Keys are empty.
    pub fn rowwise(nrows: usize) -> Self {
        Self {
            keys: vec![Vec::new(); nrows],
            rows: (0..nrows).map(|r| vec![r]).collect(),
            membership: (0..nrows).map(Some).collect(),
            lookup: HashMap::new(),
        }
    }

    /// A single group holding every row, as seen by an ungrouped table.
    pub fn whole(nrows: usize) -> Self {
        let mut lookup = HashMap::new();
        lookup.insert(Vec::new(), 0);
        Self {
            keys: vec![Vec::new()],
            rows: vec![(0..nrows).collect()],
            membership: vec![Some(0); nrows],
            lookup,
        }
    }

    pub(crate) fn partition(columns: &[&Column], nrows: usize, options: &GroupOptions) -> Self {
        let mut keys: Vec<Vec<Value>> = Vec::new();
        let mut rows: Vec<Vec<usize>> = Vec::new();
        let mut lookup: HashMap<Vec<Value>, usize> = HashMap::new();

        for row in 0..nrows {
            let key = Table::row_key(columns, row);
            if options.dropna && key.iter().any(is_missing_key) {
                continue;
            }
            let group = match lookup.get(&key) {
                Some(&g) => g,
                None => {
                    lookup.insert(key.clone(), keys.len());
                    keys.push(key);
                    rows.push(Vec::new());
                    keys.len() - 1
                }
            };
            rows[group].push(row);
        }

        if !options.drop && columns.iter().any(|c| c.is_categorical()) {
            let domains: Vec<Vec<Value>> = columns
                .iter()
                .map(|c| key_domain(c, options.dropna))
                .collect();
            for key in cross_product(&domains) {
                if !lookup.contains_key(&key) {
                    lookup.insert(key.clone(), keys.len());
                    keys.push(key);
                    rows.push(Vec::new());
                }
            }
        }

        if options.sort {
            let mut order: Vec<usize> = (0..keys.len()).collect();
            order.sort_by(|&a, &b| compare_keys(columns, &keys[a], &keys[b]));
            keys = order.iter().map(|&g| std::mem::take(&mut keys[g])).collect();
            rows = order.iter().map(|&g| std::mem::take(&mut rows[g])).collect();
        }

        let mut membership = vec![None; nrows];
        for (group, members) in rows.iter().enumerate() {
            for &row in members {
                membership[row] = Some(group);
            }
        }
        let lookup = keys
            .iter()
            .enumerate()
            .map(|(g, k)| (k.clone(), g))
            .collect();

        Self {
            keys,
            rows,
            membership,
            lookup,
        }
    }

    /// Number of groups, including empty ones.
    pub fn n_groups(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows in the indexed table.
    pub fn nrows(&self) -> usize {
        self.membership.len()
    }

    /// Group keys in group order.
    pub fn keys(&self) -> &[Vec<Value>] {
        &self.keys
    }

    /// Key of one group.
    pub fn key(&self, group: usize) -> Option<&[Value]> {
        self.keys.get(group).map(Vec::as_slice)
    }

    /// Member rows of the group with this key, in row order.
    pub fn rows_of(&self, key: &[Value]) -> Option<&[usize]> {
        self.lookup.get(key).map(|&g| self.rows[g].as_slice())
    }

    /// Member rows of one group.
    pub fn group_rows(&self, group: usize) -> &[usize] {
        &self.rows[group]
    }

    /// Member rows of every group.
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    /// Group of a row; `None` for rows excluded by `dropna`.
    pub fn membership(&self, row: usize) -> Option<usize> {
        self.membership.get(row).copied().flatten()
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }

    /// Per-row group id.
    pub fn group_indices(&self) -> &[Option<usize>] {
        &self.membership
    }
}

/// Candidate key values of one grouping column for empty-group expansion.
fn key_domain(column: &Column, dropna: bool) -> Vec<Value> {
    let mut domain: Vec<Value> = match column.levels() {
        Some(levels) => levels.iter().map(|l| Value::Str(l.clone())).collect(),
        None => column.unique().into_iter().filter(|v| !is_missing_key(v)).collect(),
    };
    if !dropna {
        domain.extend(column.unique().into_iter().filter(is_missing_key));
    }
    domain
}

/// Missing for `dropna`: nulls and NaN floats.
fn is_missing_key(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Float(f) => f.is_nan(),
        _ => false,
    }
}

/// Every combination of one value from each domain, first domain slowest.
pub(crate) fn cross_product(domains: &[Vec<Value>]) -> Vec<Vec<Value>> {
    domains.iter().fold(vec![Vec::new()], |acc, domain| {
        acc.iter()
            .flat_map(|prefix| {
                domain.iter().map(move |value| {
                    let mut key = prefix.clone();
                    key.push(value.clone());
                    key
                })
            })
            .collect()
    })
}

/// Key ordering: categorical columns by level position, others by value.
/// Missing values sort last either way.
pub(crate) fn compare_keys(columns: &[&Column], a: &[Value], b: &[Value]) -> Ordering {
    for (i, column) in columns.iter().enumerate() {
        let ord = match column.levels() {
            Some(levels) => level_rank(levels, &a[i]).cmp(&level_rank(levels, &b[i])),
            None => a[i].cmp(&b[i]),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn level_rank(levels: &[String], value: &Value) -> usize {
    match value {
        Value::Str(s) => levels.iter().position(|l| l == s).unwrap_or(levels.len()),
        _ => levels.len() + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            ("g", Column::from(vec!["b", "a", "b", "c"])),
            ("x", Column::from(vec![1, 2, 3, 4])),
        ])
        .unwrap()
    }

    #[test]
    fn test_sorted_partition() {
        let options = GroupOptions {
            sort: true,
            ..GroupOptions::default()
        };
        let index = GroupIndex::build(&sample(), &["g"], &options).unwrap();
        assert_eq!(index.n_groups(), 3);
        assert_eq!(index.key(0), Some(&[Value::from("a")][..]));
        assert_eq!(index.rows_of(&[Value::from("b")]), Some(&[0, 2][..]));
        assert_eq!(index.membership(3), Some(2));
        assert_eq!(index.group_sizes(), vec![1, 2, 1]);
    }

    #[test]
    fn test_default_keeps_first_occurrence() {
        let index = GroupIndex::build(&sample(), &["g"], &GroupOptions::default()).unwrap();
        let keys: Vec<String> = index.keys().iter().map(|k| k[0].to_string()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(index.group_sizes(), vec![2, 1, 1]);
    }

    #[test]
    fn test_unknown_group_var() {
        let err = GroupIndex::build(&sample(), &["nope"], &GroupOptions::default());
        assert!(matches!(err, Err(TidyError::InvalidGroupVars(v)) if v == vec!["nope"]));
    }

    #[test]
    fn test_dropna_excludes_rows() {
        let table = Table::from_columns(vec![(
            "g",
            Column::new(vec![Value::from(1), Value::Null, Value::from(1)]),
        )])
        .unwrap();
        let keep = GroupIndex::build(&table, &["g"], &GroupOptions::default()).unwrap();
        assert_eq!(keep.n_groups(), 2);
        assert_eq!(keep.key(1), Some(&[Value::Null][..]));

        let options = GroupOptions {
            dropna: true,
            ..GroupOptions::default()
        };
        let dropped = GroupIndex::build(&table, &["g"], &options).unwrap();
        assert_eq!(dropped.n_groups(), 1);
        assert_eq!(dropped.membership(1), None);
        assert_eq!(dropped.group_indices(), &[Some(0), None, Some(0)]);
    }

    #[test]
    fn test_dropna_excludes_nan_keys() {
        let table = Table::from_columns(vec![(
            "g",
            Column::new(vec![Value::float(1.5), Value::float(f64::NAN), Value::Null]),
        )])
        .unwrap();
        let options = GroupOptions {
            dropna: true,
            ..GroupOptions::default()
        };
        let index = GroupIndex::build(&table, &["g"], &options).unwrap();
        assert_eq!(index.n_groups(), 1);
        assert_eq!(index.group_indices(), &[Some(0), None, None]);

        let kept = GroupIndex::build(&table, &["g"], &GroupOptions::default()).unwrap();
        assert_eq!(kept.n_groups(), 3);
    }

    #[test]
    fn test_drop_false_adds_empty_level_groups() {
        let levels = vec!["lo".to_string(), "mid".to_string(), "hi".to_string()];
        let f = Column::categorical(vec![Value::from("hi"), Value::from("lo")], levels).unwrap();
        let table = Table::from_columns(vec![("f", f)]).unwrap();
        let options = GroupOptions {
            sort: true,
            drop: false,
            ..GroupOptions::default()
        };
        let index = GroupIndex::build(&table, &["f"], &options).unwrap();
        let keys: Vec<String> = index.keys().iter().map(|k| k[0].to_string()).collect();
        assert_eq!(keys, vec!["lo", "mid", "hi"]);
        assert_eq!(index.group_sizes(), vec![1, 0, 1]);
    }

    #[test]
    fn test_rowwise_and_whole() {
        let rowwise = GroupIndex::rowwise(3);
        assert_eq!(rowwise.n_groups(), 3);
        assert_eq!(rowwise.group_rows(2), &[2]);

        let whole = GroupIndex::whole(3);
        assert_eq!(whole.n_groups(), 1);
        assert_eq!(whole.rows_of(&[]), Some(&[0, 1, 2][..]));
    }

    #[test]
    fn test_cross_product_order() {
        let product = cross_product(&[
            vec![Value::from(1), Value::from(2)],
            vec![Value::from("a"), Value::from("b")],
        ]);
        assert_eq!(product.len(), 4);
        assert_eq!(product[1], vec![Value::from(1), Value::from("b")]);
    }
}
