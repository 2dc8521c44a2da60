//! Groups command - show group keys and sizes.

use std::path::PathBuf;

use colored::Colorize;
use tidyframe::eval::all_of;
use tidyframe::{Arg, Column, Expr, GroupedTable, VerbCall, VerbRegistry, Value, lit};

use super::{CommandResult, emit, load};

pub fn run(
    file: PathBuf,
    by: Vec<String>,
    sort: bool,
    dropna: bool,
    json: bool,
    output: Option<PathBuf>,
) -> CommandResult {
    let registry = VerbRegistry::with_defaults();
    let table = load(&file, &[])?;
    let grouped = registry.call(
        &table,
        &VerbCall::new("group_by")
            .arg(Arg::new(Expr::Select(all_of(&by))))
            .arg(Arg::param("sort", lit(sort)))
            .arg(Arg::param("dropna", lit(dropna))),
    )?;

    let sizes: Vec<Value> = grouped
        .group_sizes()
        .into_iter()
        .map(|s| Value::Int(s as i64))
        .collect();
    let keys = grouped.group_keys()?.with_column("n", Column::new(sizes))?;

    if json {
        let report = serde_json::json!({
            "group_vars": grouped.group_vars(),
            "n_groups": grouped.n_groups(),
            "groups": keys,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        eprintln!(
            "{} {}",
            "Groups:".cyan().bold(),
            grouped.n_groups().to_string().white().bold()
        );
        return Ok(());
    }
    emit(&GroupedTable::plain(keys), output)
}
