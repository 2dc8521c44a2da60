//! CLI command implementations.

pub mod complete;
pub mod groups;
pub mod join;
pub mod rank;
pub mod select;

use std::io;
use std::path::{Path, PathBuf};

use colored::Colorize;
use log::debug;
use tidyframe::eval::all_of;
use tidyframe::io::{write_delimited, write_file};
use tidyframe::{Arg, Expr, GroupedTable, Parser, ParserConfig, VerbCall, VerbRegistry};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Read a delimited file as an ungrouped table.
pub fn load(path: &Path, categorical: &[String]) -> tidyframe::Result<GroupedTable> {
    let config = ParserConfig {
        categorical: categorical.to_vec(),
        ..ParserConfig::default()
    };
    let table = Parser::with_config(config).parse_file(path)?;
    debug!("loaded {} ({} rows)", path.display(), table.nrows());
    Ok(GroupedTable::plain(table))
}

/// Group by `columns` through the registry; no columns leaves the table as is.
pub fn group(registry: &VerbRegistry, table: GroupedTable, columns: &[String]) -> tidyframe::Result<GroupedTable> {
    if columns.is_empty() {
        return Ok(table);
    }
    registry.call(
        &table,
        &VerbCall::new("group_by").arg(Arg::new(Expr::Select(all_of(columns)))),
    )
}

/// Write the result and print its grouping summary to stderr.
pub fn emit(table: &GroupedTable, output: Option<PathBuf>) -> CommandResult {
    match &output {
        Some(path) => write_file(table.table(), path)?,
        None => write_delimited(table.table(), io::stdout().lock(), b',')?,
    }
    let grouping = table.summary().unwrap_or_else(|| "Ungrouped".to_string());
    eprintln!(
        "{} {} rows x {} columns, {}",
        "Result:".cyan().bold(),
        table.nrows().to_string().white().bold(),
        table.table().ncols(),
        grouping.yellow()
    );
    if let Some(path) = output {
        eprintln!("{} {}", "Wrote".green(), path.display());
    }
    Ok(())
}
