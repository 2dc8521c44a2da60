//! Function library available inside expressions.
//!
//! Window functions map a sequence to one value per element; aggregates map
//! a sequence to a single value. Trailing arguments after the data argument
//! are parameters and must evaluate to scalars.

use crate::error::{Result, TidyError};
use crate::table::{NaOption, RankMethod, Value};
use crate::verbs::rank::{
    cume_dist_values, min_rank_values, ntile_values, percent_rank_values, rank_values,
    row_number_values,
};

use super::expr::BinaryOp;

pub(crate) type WindowFn = fn(&[Value], &[Value]) -> Result<Vec<Value>>;
pub(crate) type AggregateFn = fn(&[Value]) -> Result<Value>;

#[derive(Clone, Copy)]
pub(crate) enum Kernel {
    Window(WindowFn),
    Aggregate(AggregateFn),
}

/// A library function.
#[derive(Clone, Copy)]
pub(crate) struct Function {
    pub name: &'static str,
    pub kernel: Kernel,
    /// Maximum number of parameters after the data argument.
    pub max_params: usize,
    /// Callable without a data argument (`n()`, `row_number()`).
    pub nullary: bool,
}

const FUNCTIONS: &[Function] = &[
    window("row_number", |v, _| row_number_values(v), 0, true),
    window("min_rank", |v, _| min_rank_values(v), 0, false),
    window("rank", rank_fn, 2, false),
    window("ntile", ntile_fn, 1, false),
    window("percent_rank", |v, _| percent_rank_values(v), 0, false),
    window("cume_dist", |v, _| cume_dist_values(v), 0, false),
    window("desc", |v, _| desc(v), 0, false),
    window("is_na", |v, _| Ok(v.iter().map(|x| Value::Bool(x.is_null())).collect()), 0, false),
    aggregate("n", |v| Ok(Value::Int(v.len() as i64)), true),
    aggregate("sum", sum, false),
    aggregate("mean", mean, false),
    aggregate("min", |v| extreme(v, "min", false), false),
    aggregate("max", |v| extreme(v, "max", true), false),
    aggregate("sd", sd, false),
    aggregate("first", |v| Ok(v.first().cloned().unwrap_or_default()), false),
    aggregate("last", |v| Ok(v.last().cloned().unwrap_or_default()), false),
];

const fn window(name: &'static str, f: WindowFn, max_params: usize, nullary: bool) -> Function {
    Function {
        name,
        kernel: Kernel::Window(f),
        max_params,
        nullary,
    }
}

const fn aggregate(name: &'static str, f: AggregateFn, nullary: bool) -> Function {
    Function {
        name,
        kernel: Kernel::Aggregate(f),
        max_params: 0,
        nullary,
    }
}

/// Find a function by name.
pub(crate) fn lookup(name: &str) -> Result<Function> {
    FUNCTIONS
        .iter()
        .find(|f| f.name == name)
        .copied()
        .ok_or_else(|| TidyError::UnknownFunction(name.to_string()))
}

/// Names of every library function.
pub fn function_names() -> Vec<&'static str> {
    FUNCTIONS.iter().map(|f| f.name).collect()
}

fn rank_fn(values: &[Value], params: &[Value]) -> Result<Vec<Value>> {
    let method = match params.first() {
        None | Some(Value::Null) => RankMethod::Average,
        Some(Value::Str(s)) => s.parse()?,
        Some(other) => return Err(TidyError::type_mismatch("rank method", "string", other.type_name())),
    };
    let na = match params.get(1) {
        None => NaOption::Keep,
        Some(Value::Str(s)) if s == "keep" => NaOption::Keep,
        Some(Value::Bool(b)) => NaOption::from_na_last(Some(*b)),
        Some(other) => {
            return Err(TidyError::InvalidArgument(format!(
                "na_last must be true, false or \"keep\", got {}",
                other
            )));
        }
    };
    rank_values(values, method, na)
}

fn ntile_fn(values: &[Value], params: &[Value]) -> Result<Vec<Value>> {
    match params.first() {
        Some(Value::Int(n)) => ntile_values(values, *n),
        Some(Value::Float(n)) if n.0.fract() == 0.0 => ntile_values(values, n.0 as i64),
        Some(other) => Err(TidyError::type_mismatch("ntile", "integer", other.type_name())),
        None => Err(TidyError::InvalidArgument("ntile() needs a bucket count".to_string())),
    }
}

fn desc(values: &[Value]) -> Result<Vec<Value>> {
    values
        .iter()
        .map(|v| {
            Ok(match v {
                Value::Int(i) => i.checked_neg().map_or_else(|| Value::float(-(*i as f64)), Value::Int),
                other => Value::from(other.numeric("desc")?.map(|x| -x)),
            })
        })
        .collect()
}

fn numbers(values: &[Value], context: &str) -> Result<Option<Vec<f64>>> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        if value.is_null() {
            return Ok(None);
        }
        match value.as_f64() {
            Some(x) => out.push(x),
            None => return Err(TidyError::type_mismatch(context, "numeric", value.type_name())),
        }
    }
    Ok(Some(out))
}

fn sum(values: &[Value]) -> Result<Value> {
    let Some(xs) = numbers(values, "sum")? else {
        return Ok(Value::Null);
    };
    if values.iter().all(|v| matches!(v, Value::Int(_) | Value::Bool(_))) {
        let mut total: i64 = 0;
        for v in values {
            let x = match v {
                Value::Int(i) => *i,
                Value::Bool(b) => i64::from(*b),
                _ => 0,
            };
            match total.checked_add(x) {
                Some(t) => total = t,
                None => return Ok(Value::float(xs.iter().sum())),
            }
        }
        return Ok(Value::Int(total));
    }
    Ok(Value::float(xs.iter().sum()))
}

fn mean(values: &[Value]) -> Result<Value> {
    match numbers(values, "mean")? {
        Some(xs) if !xs.is_empty() => Ok(Value::float(xs.iter().sum::<f64>() / xs.len() as f64)),
        _ => Ok(Value::Null),
    }
}

fn sd(values: &[Value]) -> Result<Value> {
    match numbers(values, "sd")? {
        Some(xs) if xs.len() >= 2 => {
            let n = xs.len() as f64;
            let mean = xs.iter().sum::<f64>() / n;
            let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
            Ok(Value::float(var.sqrt()))
        }
        _ => Ok(Value::Null),
    }
}

fn extreme(values: &[Value], context: &str, largest: bool) -> Result<Value> {
    if values.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    let mut kinds = values.iter().map(|v| match v {
        Value::Bool(_) | Value::Int(_) | Value::Float(_) => Ok("numeric"),
        Value::Str(_) => Ok("string"),
        other => Err(TidyError::type_mismatch(context, "numeric or string", other.type_name())),
    });
    if let Some(first) = kinds.next() {
        let first = first?;
        for kind in kinds {
            let kind = kind?;
            if kind != first {
                return Err(TidyError::type_mismatch(context, first, kind));
            }
        }
    }
    let picked = if largest {
        values.iter().max_by(|a, b| compare(a, b))
    } else {
        values.iter().min_by(|a, b| compare(a, b))
    };
    Ok(picked.cloned().unwrap_or_default())
}

fn compare(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}

/// Apply a binary operator to two values.
///
/// Missing operands give a missing result, except that `&` and `|` follow
/// three-valued logic.
pub(crate) fn binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    match op {
        BinaryOp::And | BinaryOp::Or => logical(op, lhs, rhs),
        _ if lhs.is_null() || rhs.is_null() => Ok(Value::Null),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => arithmetic(op, lhs, rhs),
        _ => comparison(op, lhs, rhs),
    }
}

fn arithmetic(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    let context = format!("operator {}", op.symbol());
    if let (Value::Int(a), Value::Int(b)) = (lhs, rhs) {
        let exact = match op {
            BinaryOp::Add => a.checked_add(*b),
            BinaryOp::Sub => a.checked_sub(*b),
            BinaryOp::Mul => a.checked_mul(*b),
            _ => None,
        };
        if let Some(x) = exact {
            return Ok(Value::Int(x));
        }
    }
    let a = lhs
        .as_f64()
        .ok_or_else(|| TidyError::type_mismatch(&context, "numeric", lhs.type_name()))?;
    let b = rhs
        .as_f64()
        .ok_or_else(|| TidyError::type_mismatch(&context, "numeric", rhs.type_name()))?;
    Ok(Value::float(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        _ => a / b,
    }))
}

fn comparison(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    let ord = match (lhs, rhs) {
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => match a.partial_cmp(&b) {
                Some(ord) => ord,
                None => return Ok(Value::Null),
            },
            _ => {
                return Err(TidyError::type_mismatch(
                    format!("operator {}", op.symbol()),
                    lhs.type_name(),
                    rhs.type_name(),
                ));
            }
        },
    };
    Ok(Value::Bool(match op {
        BinaryOp::Eq => ord.is_eq(),
        BinaryOp::NotEq => ord.is_ne(),
        BinaryOp::Lt => ord.is_lt(),
        BinaryOp::LtEq => ord.is_le(),
        BinaryOp::Gt => ord.is_gt(),
        _ => ord.is_ge(),
    }))
}

fn truth(value: &Value, op: BinaryOp) -> Result<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        other => Err(TidyError::type_mismatch(
            format!("operator {}", op.symbol()),
            "boolean",
            other.type_name(),
        )),
    }
}

fn logical(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    let (a, b) = (truth(lhs, op)?, truth(rhs, op)?);
    let out = match op {
        BinaryOp::And => match (a, b) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        _ => match (a, b) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
    };
    Ok(Value::from(out))
}

pub(crate) fn negate(value: &Value) -> Result<Value> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(TidyError::type_mismatch("operator !", "boolean", other.type_name())),
    }
}
