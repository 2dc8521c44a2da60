//! Cell values.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use ordered_float::OrderedFloat;
use serde::Serialize;

use super::frame::Table;
use crate::error::{Result, TidyError};

/// A single cell of a table.
///
/// Values are totally ordered so they can serve as group keys and be sorted:
/// booleans sort before numbers, numbers before strings, strings before
/// nested tables, and missing values sort last. Integers and floats compare
/// numerically with each other.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Whole number.
    Int(i64),
    /// Floating-point number.
    Float(OrderedFloat<f64>),
    /// Text value (also used for categorical cells).
    Str(String),
    /// Nested table, as produced by `nest_join`.
    Table(Box<Table>),
}

impl Value {
    /// Create a float value.
    pub fn float(value: f64) -> Self {
        Value::Float(OrderedFloat(value))
    }

    /// Returns true for missing values.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Table(_) => "table",
        }
    }

    /// Numeric view of the value, if it has one. Booleans count as 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(f.0),
            _ => None,
        }
    }

    /// Numeric view for kernels: missing (and NaN) map to `None`, non-numeric
    /// values are a `TypeMismatch`.
    pub fn numeric(&self, context: &str) -> Result<Option<f64>> {
        match self {
            Value::Null => Ok(None),
            Value::Float(f) if f.0.is_nan() => Ok(None),
            other => other
                .as_f64()
                .map(Some)
                .ok_or_else(|| TidyError::type_mismatch(context, "numeric", other.type_name())),
        }
    }

    /// Boolean view, used by row filters. Missing counts as `None`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn type_order(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Str(_) => 2,
            Value::Table(_) => 3,
            Value::Null => 4,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                cmp_int_float(*a, *b) == Ordering::Equal
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Integral floats hash like the integer they equal.
        match self {
            Value::Null => 0u8.hash(state),
            Value::Bool(b) => (1u8, b).hash(state),
            Value::Int(i) => (2u8, i).hash(state),
            Value::Float(f) => match integral(f.0) {
                Some(i) => (2u8, i).hash(state),
                None => (3u8, f).hash(state),
            },
            Value::Str(s) => (4u8, s).hash(state),
            Value::Table(t) => {
                5u8.hash(state);
                t.nrows().hash(state);
                t.column_names().hash(state);
            }
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => cmp_int_float(*a, *b),
            (Value::Float(a), Value::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::Table(a), Value::Table(b)) => a.cmp_rows(b),
            _ => self.type_order().cmp(&other.type_order()),
        }
    }
}

const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// The integer an integral, in-range float equals exactly.
fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f)).then_some(f as i64)
}

/// Exact comparison of an integer with a float. NaN sorts above every number.
fn cmp_int_float(i: i64, f: OrderedFloat<f64>) -> Ordering {
    let f = f.0;
    if f.is_nan() || f >= I64_BOUND {
        return Ordering::Less;
    }
    if f < -I64_BOUND {
        return Ordering::Greater;
    }
    match i.cmp(&(f.floor() as i64)) {
        Ordering::Equal if f.fract() != 0.0 => Ordering::Less,
        other => other,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NA"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x.0),
            Value::Str(s) => write!(f, "{}", s),
            Value::Table(t) => write!(f, "<table {}x{}>", t.nrows(), t.ncols()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Table> for Value {
    fn from(value: Table) -> Self {
        Value::Table(Box::new(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}
