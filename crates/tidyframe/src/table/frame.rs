//! In-memory columnar table.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::column::Column;
use super::value::Value;
use crate::error::{Result, TidyError};

/// An ordered set of equally long, uniquely named columns.
///
/// Tables are plain data: they carry no grouping information. Grouping lives
/// in [`GroupedTable`](crate::GroupedTable), which wraps a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    columns: IndexMap<String, Column>,
    nrows: usize,
}

impl Table {
    /// Create an empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from named columns.
    ///
    /// All columns must have the same length and distinct names.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut table = Table::new();
        for (name, column) in columns {
            let name = name.into();
            if table.columns.contains_key(&name) {
                return Err(TidyError::DuplicateColumn(name));
            }
            table = table.with_column(name, column)?;
        }
        Ok(table)
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Returns true if a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Get a column by name, failing with `UnknownColumn` if absent.
    pub fn column_required(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| TidyError::UnknownColumn(vec![name.to_string()]))
    }

    /// Iterate over `(name, column)` pairs in order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.columns.get(column)?.get(row)
    }

    /// Keep the named columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let missing: Vec<String> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|n| !self.has_column(n))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(TidyError::UnknownColumn(missing));
        }

        let mut columns = IndexMap::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if let Some(column) = self.columns.get(name) {
                columns.insert(name.to_string(), column.clone());
            }
        }
        Ok(Table {
            columns,
            nrows: self.nrows,
        })
    }

    /// Drop the named columns; unknown names are ignored.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let columns = self
            .columns
            .iter()
            .filter(|(k, _)| !names.iter().any(|n| n.as_ref() == k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Table {
            columns,
            nrows: self.nrows,
        }
    }

    /// Gather rows at the given positions, in the given order.
    pub fn take(&self, rows: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(k, v)| (k.clone(), v.take(rows)))
                .collect(),
            nrows: rows.len(),
        }
    }

    /// Gather rows; `None` positions produce a row of missing values.
    pub fn take_optional(&self, rows: &[Option<usize>]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(k, v)| (k.clone(), v.take_optional(rows)))
                .collect(),
            nrows: rows.len(),
        }
    }

    /// Keep the rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.nrows {
            return Err(TidyError::LengthMismatch {
                column: "<filter mask>".to_string(),
                expected: self.nrows,
                actual: mask.len(),
            });
        }
        Ok(Table {
            columns: self
                .columns
                .iter()
                .map(|(k, v)| (k.clone(), v.filter(mask)))
                .collect(),
            nrows: mask.iter().filter(|keep| **keep).count(),
        })
    }

    /// Add or replace a column. A replaced column keeps its position.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Table> {
        let name = name.into();
        if self.columns.is_empty() {
            self.nrows = column.len();
        } else if column.len() != self.nrows {
            return Err(TidyError::LengthMismatch {
                column: name,
                expected: self.nrows,
                actual: column.len(),
            });
        }
        self.columns.insert(name, column);
        Ok(self)
    }

    /// Rename columns in place, keeping their positions.
    pub fn rename<S: AsRef<str>>(&self, renames: &[(S, S)]) -> Result<Table> {
        let mut columns = IndexMap::with_capacity(self.columns.len());
        for (name, column) in &self.columns {
            let new_name = renames
                .iter()
                .find(|(old, _)| old.as_ref() == name)
                .map(|(_, new)| new.as_ref().to_string())
                .unwrap_or_else(|| name.clone());
            if columns.insert(new_name.clone(), column.clone()).is_some() {
                return Err(TidyError::DuplicateColumn(new_name));
            }
        }
        Ok(Table {
            columns,
            nrows: self.nrows,
        })
    }

    /// Stack row-disjoint parts with identical column names end to end.
    pub fn vstack(parts: &[Table]) -> Result<Table> {
        let Some(first) = parts.first() else {
            return Ok(Table::new());
        };
        let names = first.column_names();
        for part in &parts[1..] {
            if part.column_names() != names {
                return Err(TidyError::InvalidArgument(format!(
                    "cannot stack tables with columns {:?} and {:?}",
                    names,
                    part.column_names()
                )));
            }
        }

        let mut columns = IndexMap::with_capacity(names.len());
        for name in &names {
            let stacked = Column::concat(parts.iter().filter_map(|p| p.column(name)));
            columns.insert(name.to_string(), stacked);
        }
        Ok(Table {
            columns,
            nrows: parts.iter().map(Table::nrows).sum(),
        })
    }

    /// Values of the given columns for one row.
    pub(crate) fn row_key(columns: &[&Column], row: usize) -> Vec<Value> {
        columns.iter().map(|c| c.values()[row].clone()).collect()
    }

    /// Structural ordering used when nested tables are compared.
    pub(crate) fn cmp_rows(&self, other: &Table) -> Ordering {
        self.nrows
            .cmp(&other.nrows)
            .then_with(|| self.column_names().cmp(&other.column_names()))
            .then_with(|| {
                self.columns
                    .values()
                    .zip(other.columns.values())
                    .map(|(a, b)| a.values().cmp(b.values()))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            })
    }
}

/// Tables serialise as a list of records.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.nrows))?;
        for row in 0..self.nrows {
            seq.serialize_element(&Record { table: self, row })?;
        }
        seq.end()
    }
}

struct Record<'a> {
    table: &'a Table,
    row: usize,
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.ncols()))?;
        for (name, column) in self.table.columns() {
            map.serialize_entry(name, &column.values()[self.row])?;
        }
        map.end()
    }
}
