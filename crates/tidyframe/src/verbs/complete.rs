//! Making implicit missing combinations explicit.

use std::sync::Arc;

use log::debug;

use crate::error::{Result, TidyError};
use crate::group::{GroupedTable, GroupingKind, cross_product};
use crate::table::{Column, JoinHow, KeyOutput, MergeSpec, Table, Value, merge};

/// One dimension of the expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteSpec {
    /// Every level of a categorical column, or every observed value.
    Column(String),
    /// An explicit set of values for a column.
    Values { column: String, values: Vec<Value> },
}

impl CompleteSpec {
    fn column(&self) -> &str {
        match self {
            CompleteSpec::Column(c) | CompleteSpec::Values { column: c, .. } => c,
        }
    }
}

/// Expand the table to every combination of the given columns.
///
/// The expansion rows come first, followed by data rows whose values fall
/// outside the expansion. `fill` replaces missing values per column. Grouped
/// tables expand within each group.
pub fn complete(table: &GroupedTable, specs: &[CompleteSpec], fill: &[(String, Value)]) -> Result<GroupedTable> {
    let active: Vec<&CompleteSpec> = specs
        .iter()
        .filter(|s| !matches!(s, CompleteSpec::Values { values, .. } if values.is_empty()))
        .collect();
    if active.is_empty() {
        return Ok(table.clone());
    }

    let missing: Vec<String> = active
        .iter()
        .map(|s| s.column())
        .chain(fill.iter().map(|(c, _)| c.as_str()))
        .filter(|c| !table.table().has_column(c))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(TidyError::UnknownColumn(missing));
    }
    for (i, spec) in active.iter().enumerate() {
        if active[..i].iter().any(|s| s.column() == spec.column()) {
            return Err(TidyError::DuplicateColumn(spec.column().to_string()));
        }
    }

    let completed = match table.grouping_kind() {
        GroupingKind::Grouped => complete_groups(table, &active)?,
        _ => complete_table(table.table(), &active)?,
    };
    let filled = fill_missing(completed, fill)?;
    debug!("complete: {} rows -> {} rows", table.nrows(), filled.nrows());
    Ok(GroupedTable::reconstruct(table, Arc::new(filled)))
}

fn complete_groups(table: &GroupedTable, specs: &[&CompleteSpec]) -> Result<Table> {
    let vars = table.group_vars();
    let inner: Vec<&CompleteSpec> = specs
        .iter()
        .copied()
        .filter(|s| !vars.iter().any(|v| v == s.column()))
        .collect();
    let index = table.index();

    let mut parts = Vec::with_capacity(index.n_groups() + 1);
    for (group, rows) in index.rows().iter().enumerate() {
        if rows.is_empty() {
            continue;
        }
        let part = table.table().take(rows);
        let part = if inner.is_empty() {
            part
        } else {
            let expanded = complete_table(&part, &inner)?;
            restore_keys(expanded, vars, index.key(group).unwrap_or_default())?
        };
        parts.push(leading(part, vars)?);
    }
    let excluded: Vec<usize> = (0..table.nrows())
        .filter(|&r| index.membership(r).is_none())
        .collect();
    if !excluded.is_empty() {
        parts.push(leading(table.table().take(&excluded), vars)?);
    }
    align_and_stack(parts)
}

/// Expansion columns first, then the remaining data columns.
fn complete_table(data: &Table, specs: &[&CompleteSpec]) -> Result<Table> {
    let mut columns = Vec::with_capacity(specs.len());
    let domains = specs
        .iter()
        .map(|s| domain(data, s))
        .collect::<Result<Vec<_>>>()?;
    let combos = cross_product(&domains);
    for (i, spec) in specs.iter().enumerate() {
        let values: Vec<Value> = combos.iter().map(|combo| combo[i].clone()).collect();
        let source = data.column_required(spec.column())?;
        let column = match source.levels() {
            Some(levels) => Column::categorical(values.clone(), levels.to_vec())
                .unwrap_or_else(|_| Column::new(values)),
            None => Column::new(values),
        };
        columns.push((spec.column().to_string(), column));
    }
    let expansion = Table::from_columns(columns)?;

    let keys: Vec<String> = specs.iter().map(|s| s.column().to_string()).collect();
    merge(
        &expansion,
        data,
        &MergeSpec {
            left_on: &keys,
            right_on: &keys,
            how: JoinHow::Full,
            suffix: ("", ""),
            keys: KeyOutput::Coalesce,
        },
    )
}

fn domain(data: &Table, spec: &CompleteSpec) -> Result<Vec<Value>> {
    let mut values = match spec {
        CompleteSpec::Values { values, .. } => values.clone(),
        CompleteSpec::Column(name) => {
            let column = data.column_required(name)?;
            if let Some(levels) = column.levels() {
                return Ok(levels.iter().map(|l| Value::Str(l.clone())).collect());
            }
            column.values().to_vec()
        }
    };
    values.sort();
    values.dedup();
    Ok(values)
}

/// Rows added by the expansion have no group keys; give them the group's.
fn restore_keys(table: Table, vars: &[String], key: &[Value]) -> Result<Table> {
    let mut out = table;
    for (var, value) in vars.iter().zip(key) {
        let column = out.column_required(var)?;
        let values = vec![value.clone(); out.nrows()];
        let replaced = match column.levels() {
            Some(levels) => Column::categorical(values, levels.to_vec())?,
            None => Column::new(values),
        };
        out = out.with_column(var.clone(), replaced)?;
    }
    Ok(out)
}

/// Move the group variables to the front.
fn leading(table: Table, vars: &[String]) -> Result<Table> {
    let mut order: Vec<&str> = vars.iter().map(String::as_str).collect();
    order.extend(table.column_names().into_iter().filter(|n| !vars.iter().any(|v| v == n)));
    table.select(&order)
}

/// Stack per-group results that may order their non-key columns differently.
fn align_and_stack(parts: Vec<Table>) -> Result<Table> {
    let Some(first) = parts.first() else {
        return Ok(Table::new());
    };
    let order: Vec<String> = first.column_names().into_iter().map(str::to_string).collect();
    let aligned = parts
        .iter()
        .map(|p| p.select(&order))
        .collect::<Result<Vec<_>>>()?;
    Table::vstack(&aligned)
}

fn fill_missing(table: Table, fill: &[(String, Value)]) -> Result<Table> {
    let mut out = table;
    for (name, replacement) in fill {
        let column = out.column_required(name)?;
        let values: Vec<Value> = column
            .values()
            .iter()
            .map(|v| if v.is_null() { replacement.clone() } else { v.clone() })
            .collect();
        let filled = match column.levels() {
            Some(levels) => Column::categorical(values, levels.to_vec())?,
            None => Column::new(values),
        };
        out = out.with_column(name.clone(), filled)?;
    }
    Ok(out)
}
