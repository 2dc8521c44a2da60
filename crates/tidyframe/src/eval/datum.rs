//! Runtime kinds of evaluated values.
//!
//! Function kernels are written against plain slices. A [`Datum`] knows how
//! to run a kernel over itself: once for a scalar or a whole column, once
//! per group for a grouped column.

use std::sync::Arc;

use log::trace;

use crate::error::{Result, TidyError};
use crate::group::GroupIndex;
use crate::table::Value;

/// A full-length column paired with the partition of its rows.
#[derive(Debug, Clone)]
pub struct GroupedColumn {
    values: Vec<Value>,
    index: Arc<GroupIndex>,
}

impl GroupedColumn {
    pub fn new(values: Vec<Value>, index: Arc<GroupIndex>) -> Result<Self> {
        if values.len() != index.nrows() {
            return Err(TidyError::LengthMismatch {
                column: "<grouped column>".to_string(),
                expected: index.nrows(),
                actual: values.len(),
            });
        }
        Ok(Self { values, index })
    }

    /// Values in row order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn index(&self) -> &Arc<GroupIndex> {
        &self.index
    }

    /// Values of one group, in row order.
    pub fn group(&self, group: usize) -> Vec<Value> {
        self.index
            .group_rows(group)
            .iter()
            .map(|&r| self.values[r].clone())
            .collect()
    }

    /// Run a one-to-one kernel on each group and reassemble the results in
    /// row order. Rows outside every group come back missing.
    pub fn map_groups<F>(&self, kernel: F) -> Result<GroupedColumn>
    where
        F: Fn(&[Value]) -> Result<Vec<Value>>,
    {
        let mut out = vec![Value::Null; self.values.len()];
        for (group, rows) in self.index.rows().iter().enumerate() {
            trace!("window kernel on group {} ({} rows)", group, rows.len());
            let result = kernel(&self.group(group))?;
            if result.len() != rows.len() {
                return Err(TidyError::LengthMismatch {
                    column: format!("<group {}>", group),
                    expected: rows.len(),
                    actual: result.len(),
                });
            }
            for (&row, value) in rows.iter().zip(result) {
                out[row] = value;
            }
        }
        Ok(GroupedColumn {
            values: out,
            index: Arc::clone(&self.index),
        })
    }

    /// Run a many-to-one kernel on each group.
    pub fn reduce_groups<F>(&self, kernel: F) -> Result<GroupScalars>
    where
        F: Fn(&[Value]) -> Result<Value>,
    {
        let mut values = Vec::with_capacity(self.index.n_groups());
        for group in 0..self.index.n_groups() {
            trace!("aggregate kernel on group {}", group);
            values.push(kernel(&self.group(group))?);
        }
        Ok(GroupScalars {
            values,
            index: Arc::clone(&self.index),
        })
    }
}

/// One value per group.
#[derive(Debug, Clone)]
pub struct GroupScalars {
    values: Vec<Value>,
    index: Arc<GroupIndex>,
}

impl GroupScalars {
    pub fn new(values: Vec<Value>, index: Arc<GroupIndex>) -> Result<Self> {
        if values.len() != index.n_groups() {
            return Err(TidyError::LengthMismatch {
                column: "<group values>".to_string(),
                expected: index.n_groups(),
                actual: values.len(),
            });
        }
        Ok(Self { values, index })
    }

    /// Values in group order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn index(&self) -> &Arc<GroupIndex> {
        &self.index
    }

    /// Expand to one value per row.
    pub fn broadcast(&self) -> Vec<Value> {
        (0..self.index.nrows())
            .map(|row| {
                self.index
                    .membership(row)
                    .map(|g| self.values[g].clone())
                    .unwrap_or_default()
            })
            .collect()
    }

    fn map<F: Fn(&Value) -> Result<Value>>(&self, f: F) -> Result<GroupScalars> {
        Ok(GroupScalars {
            values: self.values.iter().map(f).collect::<Result<_>>()?,
            index: Arc::clone(&self.index),
        })
    }
}

/// An evaluated expression.
#[derive(Debug, Clone)]
pub enum Datum {
    /// A single value, broadcast where needed.
    Scalar(Value),
    /// A flat column (whole-table evaluation or a literal vector).
    Column(Vec<Value>),
    /// A column evaluated against grouped rows.
    Grouped(GroupedColumn),
    /// One value per group.
    PerGroup(GroupScalars),
}

impl Datum {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Datum::Scalar(_) => "scalar",
            Datum::Column(_) => "column",
            Datum::Grouped(_) => "grouped column",
            Datum::PerGroup(_) => "per-group values",
        }
    }

    fn index(&self) -> Option<&Arc<GroupIndex>> {
        match self {
            Datum::Grouped(g) => Some(g.index()),
            Datum::PerGroup(s) => Some(s.index()),
            _ => None,
        }
    }

    fn row_count(&self) -> Option<usize> {
        match self {
            Datum::Scalar(_) => None,
            Datum::Column(v) => Some(v.len()),
            Datum::Grouped(g) => Some(g.values.len()),
            Datum::PerGroup(s) => Some(s.index.nrows()),
        }
    }

    /// Materialise one value per row. Scalars, length-one columns and
    /// per-group values are broadcast; other lengths must equal `nrows`.
    pub fn into_rows(self, nrows: usize, label: &str) -> Result<Vec<Value>> {
        let values = match self {
            Datum::Scalar(v) => return Ok(vec![v; nrows]),
            Datum::Column(v) if v.len() == 1 && nrows != 1 => return Ok(vec![v[0].clone(); nrows]),
            Datum::Column(v) => v,
            Datum::Grouped(g) => g.values,
            Datum::PerGroup(s) => s.broadcast(),
        };
        if values.len() != nrows {
            return Err(TidyError::LengthMismatch {
                column: label.to_string(),
                expected: nrows,
                actual: values.len(),
            });
        }
        Ok(values)
    }

    /// Materialise one value per group of `index`.
    pub fn into_groups(self, index: &GroupIndex, label: &str) -> Result<Vec<Value>> {
        let n_groups = index.n_groups();
        let mismatch = |actual: usize| TidyError::LengthMismatch {
            column: label.to_string(),
            expected: n_groups,
            actual,
        };
        match self {
            Datum::Scalar(v) => Ok(vec![v; n_groups]),
            Datum::PerGroup(s) if s.values.len() == n_groups => Ok(s.values),
            Datum::PerGroup(s) => Err(mismatch(s.values.len())),
            Datum::Column(v) if v.len() == 1 => Ok(vec![v[0].clone(); n_groups]),
            Datum::Column(v) => Err(mismatch(v.len())),
            Datum::Grouped(g) => {
                if index.rows().iter().any(|rows| rows.len() != 1) {
                    return Err(mismatch(g.values.len()));
                }
                Ok(index.rows().iter().map(|rows| g.values[rows[0]].clone()).collect())
            }
        }
    }

    /// Apply a one-to-one kernel, per group where the datum is grouped.
    pub(crate) fn map_window<F>(self, kernel: F) -> Result<Datum>
    where
        F: Fn(&[Value]) -> Result<Vec<Value>>,
    {
        match self {
            Datum::Scalar(v) => Ok(Datum::Scalar(single(kernel(&[v])?)?)),
            Datum::Column(v) => {
                let out = kernel(&v)?;
                if out.len() != v.len() {
                    return Err(TidyError::LengthMismatch {
                        column: "<window result>".to_string(),
                        expected: v.len(),
                        actual: out.len(),
                    });
                }
                Ok(Datum::Column(out))
            }
            Datum::Grouped(g) => Ok(Datum::Grouped(g.map_groups(kernel)?)),
            Datum::PerGroup(s) => Ok(Datum::PerGroup(
                s.map(|v| single(kernel(std::slice::from_ref(v))?))?,
            )),
        }
    }

    /// Apply a many-to-one kernel, per group where the datum is grouped.
    pub(crate) fn map_aggregate<F>(self, kernel: F) -> Result<Datum>
    where
        F: Fn(&[Value]) -> Result<Value>,
    {
        match self {
            Datum::Scalar(v) => Ok(Datum::Scalar(kernel(&[v])?)),
            Datum::Column(v) => Ok(Datum::Scalar(kernel(&v)?)),
            Datum::Grouped(g) => Ok(Datum::PerGroup(g.reduce_groups(kernel)?)),
            Datum::PerGroup(s) => Ok(Datum::PerGroup(
                s.map(|v| kernel(std::slice::from_ref(v)))?,
            )),
        }
    }

    /// Apply an element-wise function.
    pub(crate) fn map_values<F>(self, f: F) -> Result<Datum>
    where
        F: Fn(&Value) -> Result<Value>,
    {
        self.map_window(|values| values.iter().map(&f).collect())
    }

    /// Combine two data element-wise, broadcasting scalars, length-one
    /// columns and per-group values against rows.
    pub(crate) fn zip_with<F>(self, other: Datum, f: F) -> Result<Datum>
    where
        F: Fn(&Value, &Value) -> Result<Value>,
    {
        match (self, other) {
            (Datum::Scalar(a), Datum::Scalar(b)) => Ok(Datum::Scalar(f(&a, &b)?)),
            (Datum::PerGroup(a), Datum::Scalar(b)) => Ok(Datum::PerGroup(a.map(|x| f(x, &b))?)),
            (Datum::Scalar(a), Datum::PerGroup(b)) => Ok(Datum::PerGroup(b.map(|y| f(&a, y))?)),
            (Datum::PerGroup(a), Datum::PerGroup(b)) if a.values.len() == b.values.len() => {
                let values = a
                    .values
                    .iter()
                    .zip(&b.values)
                    .map(|(x, y)| f(x, y))
                    .collect::<Result<_>>()?;
                Ok(Datum::PerGroup(GroupScalars {
                    values,
                    index: a.index,
                }))
            }
            (a, b) => {
                let index = a.index().or(b.index()).cloned();
                let nrows = a.row_count().into_iter().chain(b.row_count()).max().unwrap_or(1);
                let left = a.into_rows(nrows, "<left operand>")?;
                let right = b.into_rows(nrows, "<right operand>")?;
                let values: Vec<Value> = left
                    .iter()
                    .zip(&right)
                    .map(|(x, y)| f(x, y))
                    .collect::<Result<_>>()?;
                match index {
                    Some(index) => Ok(Datum::Grouped(GroupedColumn::new(values, index)?)),
                    None => Ok(Datum::Column(values)),
                }
            }
        }
    }
}

fn single(mut values: Vec<Value>) -> Result<Value> {
    if values.len() != 1 {
        return Err(TidyError::LengthMismatch {
            column: "<scalar result>".to_string(),
            expected: 1,
            actual: values.len(),
        });
    }
    Ok(values.remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupOptions;
    use crate::table::{Column, Table};

    fn index() -> Arc<GroupIndex> {
        let table = Table::from_columns(vec![("g", Column::from(vec!["a", "b", "a"]))]).unwrap();
        Arc::new(GroupIndex::build(&table, &["g"], &GroupOptions::default()).unwrap())
    }

    fn ints(xs: &[i64]) -> Vec<Value> {
        xs.iter().map(|&x| Value::from(x)).collect()
    }

    #[test]
    fn test_map_groups_restores_row_order() {
        let col = GroupedColumn::new(ints(&[5, 6, 7]), index()).unwrap();
        let out = col.map_groups(|g| Ok(g.iter().rev().cloned().collect())).unwrap();
        assert_eq!(out.values(), &ints(&[7, 6, 5])[..]);
    }

    #[test]
    fn test_per_group_broadcast() {
        let scalars = GroupScalars::new(ints(&[1, 2]), index()).unwrap();
        assert_eq!(
            Datum::PerGroup(scalars).into_rows(3, "x").unwrap(),
            ints(&[1, 2, 1])
        );
    }

    #[test]
    fn test_zip_grouped_with_per_group() {
        let col = Datum::Grouped(GroupedColumn::new(ints(&[5, 6, 7]), index()).unwrap());
        let sums = Datum::PerGroup(GroupScalars::new(ints(&[10, 20]), index()).unwrap());
        let out = col
            .zip_with(sums, |a, b| Ok(Value::from(a.as_f64().unwrap_or(0.0) + b.as_f64().unwrap_or(0.0))))
            .unwrap();
        match out {
            Datum::Grouped(g) => assert_eq!(
                g.values(),
                &[Value::from(15.0), Value::from(26.0), Value::from(17.0)]
            ),
            other => panic!("unexpected kind {}", other.kind_name()),
        }
    }

    #[test]
    fn test_into_rows_rejects_bad_length() {
        let err = Datum::Column(ints(&[1, 2])).into_rows(3, "y");
        assert!(matches!(err, Err(TidyError::LengthMismatch { expected: 3, actual: 2, .. })));
    }
}
