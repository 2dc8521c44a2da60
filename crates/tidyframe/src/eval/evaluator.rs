//! Context-sensitive expression evaluation.

use std::sync::Arc;

use log::trace;

use super::context::EvalContext;
use super::datum::{Datum, GroupScalars, GroupedColumn};
use super::expr::Expr;
use super::functions::{self, Kernel};
use super::selector::Selector;
use crate::error::{Result, TidyError};
use crate::group::{GroupIndex, GroupedTable, GroupingKind};
use crate::table::{Table, Value};
use crate::verbs::rank::{group_positions, positions};

/// The outcome of resolving one argument.
#[derive(Debug, Clone)]
pub enum Resolved {
    /// Column names from a name-selection argument.
    Names(Vec<String>),
    /// Left/right name pairs from a name-selection argument.
    Pairs(Vec<(String, String)>),
    /// Evaluated data.
    Values(Datum),
}

/// How column references are materialised for one evaluator call.
enum Columns {
    Flat,
    Grouped(Arc<GroupIndex>),
}

struct Scope<'a> {
    table: &'a Table,
    columns: Columns,
}

/// Evaluates verb arguments against a grouped table.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Resolve an argument under its declared context.
    pub fn resolve(&self, expr: &Expr, context: EvalContext, table: &GroupedTable) -> Result<Resolved> {
        match context {
            EvalContext::NameSelection => self.select(expr, table.table()),
            _ => Ok(Resolved::Values(self.evaluate(expr, context, table)?)),
        }
    }

    /// Evaluate a data argument. Name-selection is not a data context.
    pub fn evaluate(&self, expr: &Expr, context: EvalContext, table: &GroupedTable) -> Result<Datum> {
        let columns = match (context, table.grouping_kind()) {
            (EvalContext::NameSelection, _) => {
                return Err(TidyError::InvalidArgument(
                    "name-selection arguments do not evaluate to data".to_string(),
                ));
            }
            (EvalContext::WholeTable, _) | (EvalContext::PerGroup, GroupingKind::Plain) => Columns::Flat,
            (EvalContext::PerGroup, _) => Columns::Grouped(table.index()),
        };
        let scope = Scope {
            table: table.table(),
            columns,
        };
        self.eval(expr, &scope)
    }

    /// Evaluate and broadcast to one value per row.
    pub fn resolve_rows(&self, expr: &Expr, context: EvalContext, table: &GroupedTable) -> Result<Vec<Value>> {
        self.evaluate(expr, context, table)?
            .into_rows(table.nrows(), &describe(expr))
    }

    /// Evaluate per group and reduce to one value per group.
    pub fn resolve_groups(&self, expr: &Expr, table: &GroupedTable) -> Result<Vec<Value>> {
        let index = table.index();
        self.evaluate(expr, EvalContext::PerGroup, table)?
            .into_groups(&index, &describe(expr))
    }

    fn select(&self, expr: &Expr, table: &Table) -> Result<Resolved> {
        match expr {
            Expr::Select(Selector::Pairs(pairs)) => {
                Selector::Pairs(pairs.clone()).resolve(table)?;
                Ok(Resolved::Pairs(pairs.clone()))
            }
            Expr::Select(selector) => Ok(Resolved::Names(selector.resolve(table)?)),
            Expr::Col(name) | Expr::Lit(Value::Str(name)) => {
                Ok(Resolved::Names(Selector::AllOf(vec![name.clone()]).resolve(table)?))
            }
            // Literal data needs no column lookup.
            Expr::Lit(value) => Ok(Resolved::Values(Datum::Scalar(value.clone()))),
            Expr::Vector(values) => Ok(Resolved::Values(Datum::Column(values.clone()))),
            other => Err(TidyError::InvalidArgument(format!(
                "expected a column selection, got {}",
                describe(other)
            ))),
        }
    }

    fn eval(&self, expr: &Expr, scope: &Scope<'_>) -> Result<Datum> {
        match expr {
            Expr::Col(name) => {
                let values = scope.table.column_required(name)?.values().to_vec();
                match &scope.columns {
                    Columns::Flat => Ok(Datum::Column(values)),
                    Columns::Grouped(index) => {
                        Ok(Datum::Grouped(GroupedColumn::new(values, Arc::clone(index))?))
                    }
                }
            }
            Expr::Lit(value) => Ok(Datum::Scalar(value.clone())),
            Expr::Vector(values) => Ok(Datum::Column(values.clone())),
            Expr::Call { func, args } => self.call(func, args, scope),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs, scope)?;
                let rhs = self.eval(rhs, scope)?;
                lhs.zip_with(rhs, |a, b| functions::binary(*op, a, b))
            }
            Expr::Not(inner) => self.eval(inner, scope)?.map_values(functions::negate),
            Expr::Select(selector) => Err(TidyError::InvalidArgument(format!(
                "column selector {:?} is only valid in a name-selection argument",
                selector
            ))),
        }
    }

    fn call(&self, name: &str, args: &[Expr], scope: &Scope<'_>) -> Result<Datum> {
        let function = functions::lookup(name)?;
        let Some((data, params)) = args.split_first() else {
            if !function.nullary {
                return Err(TidyError::InvalidArgument(format!("{}() needs an argument", name)));
            }
            return self.nullary(name, scope);
        };
        if params.len() > function.max_params {
            return Err(TidyError::InvalidArgument(format!(
                "{}() takes at most {} argument(s), got {}",
                name,
                function.max_params + 1,
                args.len()
            )));
        }

        let params = params
            .iter()
            .map(|p| match self.eval(p, scope)? {
                Datum::Scalar(v) => Ok(v),
                other => Err(TidyError::InvalidArgument(format!(
                    "parameters of {}() must be scalars, got a {}",
                    name,
                    other.kind_name()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        let data = self.eval(data, scope)?;
        trace!("calling {}() on a {}", name, data.kind_name());

        match function.kernel {
            Kernel::Window(kernel) => data.map_window(|values| kernel(values, &params)),
            Kernel::Aggregate(kernel) => data.map_aggregate(kernel),
        }
    }

    /// `n()` and `row_number()` without arguments describe the rows in scope.
    fn nullary(&self, name: &str, scope: &Scope<'_>) -> Result<Datum> {
        let nrows = scope.table.nrows();
        match (name, &scope.columns) {
            ("n", Columns::Flat) => Ok(Datum::Scalar(Value::Int(nrows as i64))),
            ("n", Columns::Grouped(index)) => {
                let sizes = index.group_sizes().into_iter().map(|s| Value::Int(s as i64)).collect();
                Ok(Datum::PerGroup(GroupScalars::new(sizes, Arc::clone(index))?))
            }
            ("row_number", Columns::Flat) => Ok(Datum::Column(positions(nrows))),
            ("row_number", Columns::Grouped(index)) => Ok(Datum::Grouped(GroupedColumn::new(
                group_positions(index),
                Arc::clone(index),
            )?)),
            _ => Err(TidyError::InvalidArgument(format!("{}() needs an argument", name))),
        }
    }
}

/// Short label for an expression, used in error messages.
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Col(name) => name.clone(),
        Expr::Lit(value) => value.to_string(),
        Expr::Vector(values) => format!("<vector of {}>", values.len()),
        Expr::Call { func, .. } => format!("{}()", func),
        Expr::Binary { op, lhs, rhs } => format!("{} {} {}", describe(lhs), op.symbol(), describe(rhs)),
        Expr::Not(inner) => format!("!{}", describe(inner)),
        Expr::Select(selector) => format!("{:?}", selector),
    }
}
