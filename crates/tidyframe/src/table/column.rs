//! Column storage and type classification.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::value::Value;
use crate::error::{Result, TidyError};

/// Data type of a column, derived from its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    /// Every value is missing (or the column is empty).
    Null,
    /// Boolean values.
    Boolean,
    /// Whole numbers.
    Integer,
    /// Floating-point numbers (integers may be mixed in).
    Float,
    /// Text values.
    String,
    /// Text values drawn from a declared level set.
    Categorical,
    /// Nested tables.
    Nested,
    /// Values of incompatible types.
    Mixed,
}

impl DType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DType::Integer | DType::Float | DType::Boolean)
    }
}

/// A column of values, optionally categorical.
///
/// A categorical column carries an ordered level set that may include
/// levels that never occur in the data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    values: Vec<Value>,
    levels: Option<Vec<String>>,
}

impl Column {
    /// Create a plain column.
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values,
            levels: None,
        }
    }

    /// Create a categorical column with an explicit level set.
    ///
    /// Every non-missing value must be a string found in `levels`.
    pub fn categorical(values: Vec<Value>, levels: Vec<String>) -> Result<Self> {
        let known: HashSet<&str> = levels.iter().map(String::as_str).collect();
        for value in &values {
            match value {
                Value::Null => {}
                Value::Str(s) if known.contains(s.as_str()) => {}
                other => {
                    return Err(TidyError::InvalidArgument(format!(
                        "value '{}' is not one of the declared levels",
                        other
                    )));
                }
            }
        }
        Ok(Self {
            values,
            levels: Some(levels),
        })
    }

    /// Create a categorical column whose levels are the sorted distinct values.
    pub fn factor(values: Vec<Value>) -> Result<Self> {
        let mut levels: Vec<String> = Vec::new();
        for value in &values {
            match value {
                Value::Null => {}
                Value::Str(s) => levels.push(s.clone()),
                other => levels.push(other.to_string()),
            }
        }
        levels.sort();
        levels.dedup();
        let values = values
            .into_iter()
            .map(|v| match v {
                Value::Null | Value::Str(_) => v,
                other => Value::Str(other.to_string()),
            })
            .collect();
        Self::categorical(values, levels)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the column, returning its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Value at a position.
    pub fn get(&self, row: usize) -> Option<&Value> {
        self.values.get(row)
    }

    /// Categorical levels, if any.
    pub fn levels(&self) -> Option<&[String]> {
        self.levels.as_deref()
    }

    /// Returns true if the column is categorical.
    pub fn is_categorical(&self) -> bool {
        self.levels.is_some()
    }

    /// Replace the level set, keeping the values.
    pub fn with_levels(self, levels: Vec<String>) -> Result<Self> {
        Self::categorical(self.values, levels)
    }

    /// Number of missing values.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Classify the column by the types of its non-missing values.
    pub fn dtype(&self) -> DType {
        if self.is_categorical() {
            return DType::Categorical;
        }

        let mut dtype = DType::Null;
        for value in &self.values {
            let next = match value {
                Value::Null => continue,
                Value::Bool(_) => DType::Boolean,
                Value::Int(_) => DType::Integer,
                Value::Float(_) => DType::Float,
                Value::Str(_) => DType::String,
                Value::Table(_) => DType::Nested,
            };
            dtype = match (dtype, next) {
                (DType::Null, t) => t,
                (a, b) if a == b => a,
                (DType::Integer, DType::Float) | (DType::Float, DType::Integer) => DType::Float,
                _ => return DType::Mixed,
            };
        }
        dtype
    }

    /// Distinct values in first-occurrence order.
    pub fn unique(&self) -> Vec<Value> {
        let mut seen = HashSet::new();
        self.values
            .iter()
            .filter(|v| seen.insert(*v))
            .cloned()
            .collect()
    }

    /// Gather values at the given positions.
    pub fn take(&self, rows: &[usize]) -> Self {
        Self {
            values: rows.iter().map(|&r| self.values[r].clone()).collect(),
            levels: self.levels.clone(),
        }
    }

    /// Gather values at the given positions; `None` yields a missing value.
    pub fn take_optional(&self, rows: &[Option<usize>]) -> Self {
        Self {
            values: rows
                .iter()
                .map(|r| r.map(|r| self.values[r].clone()).unwrap_or_default())
                .collect(),
            levels: self.levels.clone(),
        }
    }

    /// Keep the values where `mask` is true. The mask must match in length.
    pub(crate) fn filter(&self, mask: &[bool]) -> Self {
        Self {
            values: self
                .values
                .iter()
                .zip(mask)
                .filter(|(_, keep)| **keep)
                .map(|(v, _)| v.clone())
                .collect(),
            levels: self.levels.clone(),
        }
    }

    /// Concatenate columns end to end. Levels are unified when every part is
    /// categorical; otherwise the result is a plain column.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a Column>) -> Self {
        let parts: Vec<&Column> = parts.into_iter().collect();
        let values = parts
            .iter()
            .flat_map(|part| part.values.iter().cloned())
            .collect();

        let mut levels: Option<Vec<String>> = None;
        if !parts.is_empty() && parts.iter().all(|p| p.is_categorical()) {
            let mut acc = Vec::new();
            for part in &parts {
                merge_levels(&mut acc, part.levels().unwrap_or_default());
            }
            levels = Some(acc);
        }

        Self { values, levels }
    }

    /// Unified level set of two categorical columns: the levels of `a`, then
    /// the levels of `b` not already present. `None` unless both are
    /// categorical.
    pub fn union_levels(a: &Column, b: &Column) -> Option<Vec<String>> {
        let mut levels = a.levels()?.to_vec();
        merge_levels(&mut levels, b.levels()?);
        Some(levels)
    }
}

fn merge_levels(acc: &mut Vec<String>, extra: &[String]) {
    for level in extra {
        if !acc.contains(level) {
            acc.push(level.clone());
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Column {
    fn from(values: Vec<T>) -> Self {
        Column::new(values.into_iter().map(Into::into).collect())
    }
}
