//! Tables annotated with a grouping.

use std::fmt;
use std::sync::Arc;

use log::debug;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::index::{GroupIndex, GroupOptions};
use crate::error::{Result, TidyError};
use crate::table::{Column, Table, Value};

/// How the rows of a [`GroupedTable`] are partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingKind {
    /// No grouping: the whole table is one implicit group.
    Plain,
    /// Rows partitioned by equality of the group variables.
    Grouped,
    /// Every row is its own group.
    RowWise,
}

impl fmt::Display for GroupingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingKind::Plain => write!(f, "plain"),
            GroupingKind::Grouped => write!(f, "grouped"),
            GroupingKind::RowWise => write!(f, "rowwise"),
        }
    }
}

/// A table plus its grouping.
///
/// The table itself is shared and never mutated; every transformation
/// produces a new `GroupedTable`. The group index is built on first use and
/// shared by shallow copies.
#[derive(Debug, Clone)]
pub struct GroupedTable {
    table: Arc<Table>,
    kind: GroupingKind,
    group_vars: Vec<String>,
    options: GroupOptions,
    index: OnceCell<Arc<GroupIndex>>,
}

impl GroupedTable {
    /// Wrap a table without grouping.
    pub fn plain(table: impl Into<Arc<Table>>) -> Self {
        Self::from_parts(table.into(), GroupingKind::Plain, Vec::new(), GroupOptions::default(), None)
    }

    /// Group a table by the named columns.
    ///
    /// Repeated names are ignored. An empty list yields a plain table.
    pub fn from_source<S: AsRef<str>>(
        table: impl Into<Arc<Table>>,
        group_vars: &[S],
        options: GroupOptions,
    ) -> Result<Self> {
        let table = table.into();
        let vars = validate_vars(&table, group_vars)?;
        if vars.is_empty() {
            return Ok(Self::from_parts(table, GroupingKind::Plain, vars, options, None));
        }
        Ok(Self::from_parts(table, GroupingKind::Grouped, vars, options, None))
    }

    /// Treat every row as its own group. `group_vars` are carried along for
    /// display and for summaries, but do not affect the partition.
    pub fn as_rowwise<S: AsRef<str>>(table: impl Into<Arc<Table>>, group_vars: &[S]) -> Result<Self> {
        let table = table.into();
        let vars = validate_vars(&table, group_vars)?;
        Ok(Self::from_parts(table, GroupingKind::RowWise, vars, GroupOptions::default(), None))
    }

    pub(crate) fn from_parts(
        table: Arc<Table>,
        kind: GroupingKind,
        group_vars: Vec<String>,
        options: GroupOptions,
        index: Option<Arc<GroupIndex>>,
    ) -> Self {
        let cell = OnceCell::new();
        if let Some(index) = index {
            let _ = cell.set(index);
        }
        Self {
            table,
            kind,
            group_vars,
            options,
            index: cell,
        }
    }

    /// Copy the grouped table. A shallow copy shares both the data and the
    /// group index; a deep copy owns its data and re-derives the index.
    pub fn copy(&self, deep: bool) -> Self {
        if !deep {
            return self.clone();
        }
        Self::from_parts(
            Arc::new(self.table.as_ref().clone()),
            self.kind,
            self.group_vars.clone(),
            self.options,
            None,
        )
    }

    /// Attach the grouping of `source` to a table derived from it.
    ///
    /// Group variables that no longer exist in `result` are dropped; a
    /// grouped source with none left yields a plain table. Row-wise sources
    /// stay row-wise.
    pub fn reconstruct(source: &GroupedTable, result: impl Into<Arc<Table>>) -> GroupedTable {
        let result = result.into();
        let vars: Vec<String> = source
            .group_vars
            .iter()
            .filter(|v| result.has_column(v))
            .cloned()
            .collect();

        let kind = match source.kind {
            GroupingKind::Plain => GroupingKind::Plain,
            GroupingKind::RowWise => GroupingKind::RowWise,
            GroupingKind::Grouped if vars.is_empty() => GroupingKind::Plain,
            GroupingKind::Grouped => GroupingKind::Grouped,
        };
        if kind != source.kind || vars.len() != source.group_vars.len() {
            debug!(
                "reconstruct: {} [{}] -> {} [{}]",
                source.kind,
                source.group_vars.join(", "),
                kind,
                vars.join(", ")
            );
        }
        let vars = if kind == GroupingKind::Plain { Vec::new() } else { vars };
        Self::from_parts(result, kind, vars, source.options, None)
    }

    /// Replace the table while keeping the current index. Only valid when
    /// the rows and the grouping columns are unchanged.
    pub(crate) fn with_table_keeping_index(&self, table: Table) -> Self {
        Self::from_parts(
            Arc::new(table),
            self.kind,
            self.group_vars.clone(),
            self.options,
            self.index.get().cloned(),
        )
    }

    /// Drop the grouping, sharing the data.
    pub fn ungroup(&self) -> Self {
        Self::plain(Arc::clone(&self.table))
    }

    /// The group index, built on first access.
    pub fn index(&self) -> Arc<GroupIndex> {
        Arc::clone(self.index.get_or_init(|| Arc::new(self.build_index())))
    }

    fn build_index(&self) -> GroupIndex {
        match self.kind {
            GroupingKind::Plain => GroupIndex::whole(self.table.nrows()),
            GroupingKind::RowWise => GroupIndex::rowwise(self.table.nrows()),
            GroupingKind::Grouped => {
                let columns: Vec<&Column> = self
                    .group_vars
                    .iter()
                    .filter_map(|v| self.table.column(v))
                    .collect();
                let index = GroupIndex::partition(&columns, self.table.nrows(), &self.options);
                debug!(
                    "built group index over [{}]: {} groups from {} rows",
                    self.group_vars.join(", "),
                    index.n_groups(),
                    self.table.nrows()
                );
                index
            }
        }
    }

    /// Grouping variables in order; empty for plain tables.
    pub fn group_vars(&self) -> &[String] {
        &self.group_vars
    }

    pub fn grouping_kind(&self) -> GroupingKind {
        self.kind
    }

    pub fn options(&self) -> &GroupOptions {
        &self.options
    }

    /// The underlying table.
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub(crate) fn shared_table(&self) -> Arc<Table> {
        Arc::clone(&self.table)
    }

    /// Unwrap the underlying table, cloning only if it is shared.
    pub fn into_table(self) -> Table {
        Arc::try_unwrap(self.table).unwrap_or_else(|shared| shared.as_ref().clone())
    }

    pub fn nrows(&self) -> usize {
        self.table.nrows()
    }

    /// Number of groups. A plain table counts as one group.
    pub fn n_groups(&self) -> usize {
        self.index().n_groups()
    }

    /// One row per group holding the group keys, in group order.
    ///
    /// For row-wise tables this is the group-variable columns of every row.
    pub fn group_keys(&self) -> Result<Table> {
        match self.kind {
            GroupingKind::Plain => Ok(Table::new()),
            GroupingKind::RowWise => self.table.select(&self.group_vars),
            GroupingKind::Grouped => {
                let index = self.index();
                let mut columns = Vec::with_capacity(self.group_vars.len());
                for (i, name) in self.group_vars.iter().enumerate() {
                    let values: Vec<Value> = index.keys().iter().map(|k| k[i].clone()).collect();
                    let source = self.table.column_required(name)?;
                    let column = match source.levels() {
                        Some(levels) => Column::categorical(values, levels.to_vec())?,
                        None => Column::new(values),
                    };
                    columns.push((name.clone(), column));
                }
                Table::from_columns(columns)
            }
        }
    }

    /// Member rows of each group.
    pub fn group_rows(&self) -> Vec<Vec<usize>> {
        self.index().rows().to_vec()
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        self.index().group_sizes()
    }

    /// Group id of each row; `None` for rows excluded by `dropna`.
    pub fn group_indices(&self) -> Vec<Option<usize>> {
        self.index().group_indices().to_vec()
    }

    /// Footer text describing the grouping, e.g. `Groups: g [3]`.
    pub fn summary(&self) -> Option<String> {
        match self.kind {
            GroupingKind::Plain => None,
            GroupingKind::Grouped => Some(format!(
                "Groups: {} [{}]",
                self.group_vars.join(", "),
                self.n_groups()
            )),
            GroupingKind::RowWise if self.group_vars.is_empty() => {
                Some(format!("Rowwise [{}]", self.nrows()))
            }
            GroupingKind::RowWise => Some(format!(
                "Rowwise: {} [{}]",
                self.group_vars.join(", "),
                self.nrows()
            )),
        }
    }
}

impl From<Table> for GroupedTable {
    fn from(table: Table) -> Self {
        GroupedTable::plain(table)
    }
}

fn validate_vars<S: AsRef<str>>(table: &Table, group_vars: &[S]) -> Result<Vec<String>> {
    let missing: Vec<String> = group_vars
        .iter()
        .map(AsRef::as_ref)
        .filter(|v| !table.has_column(v))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(TidyError::InvalidGroupVars(missing));
    }
    let mut vars: Vec<String> = Vec::with_capacity(group_vars.len());
    for var in group_vars {
        let var = var.as_ref();
        if !vars.iter().any(|v| v == var) {
            vars.push(var.to_string());
        }
    }
    Ok(vars)
}
