//! Example: rank rows within groups of a delimited file.
//!
//! Usage:
//!   cargo run --example grouped_ranks -- <file_path> <group_column> <value_column>

use std::env;

use tidyframe::io::to_delimited_string;
use tidyframe::{Arg, GroupedTable, Parser, VerbCall, VerbRegistry, call, col};

fn main() -> tidyframe::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 4 {
        eprintln!("Usage: cargo run --example grouped_ranks -- <file_path> <group_column> <value_column>");
        std::process::exit(1);
    }
    let (path, by, value) = (&args[1], &args[2], &args[3]);

    let registry = VerbRegistry::with_defaults();
    let table = GroupedTable::plain(Parser::new().parse_file(path)?);

    let grouped = registry.call(&table, &VerbCall::new("group_by").arg(Arg::new(col(by))))?;
    let ranked = registry.call(
        &grouped,
        &VerbCall::new("mutate")
            .arg(Arg::named("row", call("row_number", vec![])))
            .arg(Arg::named("min_rank", call("min_rank", vec![col(value)])))
            .arg(Arg::named("pct", call("percent_rank", vec![col(value)]))),
    )?;

    println!("{}", ranked.summary().unwrap_or_default());
    print!("{}", to_delimited_string(ranked.table(), b'\t')?);
    Ok(())
}
