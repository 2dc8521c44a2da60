//! Complete command - make missing combinations explicit.

use std::path::PathBuf;

use tidyframe::eval::all_of;
use tidyframe::{Arg, Expr, VerbCall, VerbRegistry};

use super::{CommandResult, emit, group, load};

pub fn run(
    file: PathBuf,
    columns: Vec<String>,
    by: Vec<String>,
    categorical: Vec<String>,
    output: Option<PathBuf>,
) -> CommandResult {
    let registry = VerbRegistry::with_defaults();
    let table = group(&registry, load(&file, &categorical)?, &by)?;
    let completed = registry.call(
        &table,
        &VerbCall::new("complete").arg(Arg::new(Expr::Select(all_of(&columns)))),
    )?;
    emit(&completed, output)
}
