//! Rank command - add a ranking column.

use std::path::PathBuf;

use tidyframe::{Arg, VerbCall, VerbRegistry, call, col, lit};

use super::{CommandResult, emit, group, load};

pub fn run(
    file: PathBuf,
    function: String,
    column: String,
    by: Vec<String>,
    n: Option<i64>,
    name: Option<String>,
    output: Option<PathBuf>,
) -> CommandResult {
    let registry = VerbRegistry::with_defaults();
    let table = group(&registry, load(&file, &[])?, &by)?;

    let mut args = vec![col(&column)];
    if let Some(n) = n {
        args.push(lit(n));
    }
    let name = name.unwrap_or_else(|| format!("{}_{}", function, column));
    let ranked = registry.call(
        &table,
        &VerbCall::new("mutate").arg(Arg::named(&name, call(&function, args))),
    )?;
    emit(&ranked, output)
}
