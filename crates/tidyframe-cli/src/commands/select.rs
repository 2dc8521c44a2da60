//! Select command - keep a subset of columns.

use std::path::PathBuf;

use tidyframe::eval::{all_of, matches, starts_with};
use tidyframe::{Arg, Expr, VerbCall, VerbRegistry};

use super::{CommandResult, emit, load};

pub fn run(
    file: PathBuf,
    columns: Vec<String>,
    pattern: Option<String>,
    prefix: Option<String>,
    output: Option<PathBuf>,
) -> CommandResult {
    let registry = VerbRegistry::with_defaults();
    let table = load(&file, &[])?;

    let mut call = VerbCall::new("select");
    if !columns.is_empty() {
        call = call.arg(Arg::new(Expr::Select(all_of(&columns))));
    }
    if let Some(pattern) = pattern {
        call = call.arg(Arg::new(Expr::Select(matches(&pattern))));
    }
    if let Some(prefix) = prefix {
        call = call.arg(Arg::new(Expr::Select(starts_with(&[prefix]))));
    }
    if call.args.is_empty() {
        return Err("nothing to select: pass --columns, --matches or --starts-with".into());
    }

    let selected = registry.call(&table, &call)?;
    emit(&selected, output)
}
