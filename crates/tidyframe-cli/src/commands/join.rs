//! Join command - join two files through the registry.

use std::path::PathBuf;

use tidyframe::eval::{all_of, pairs};
use tidyframe::{Arg, Expr, VerbCall, VerbRegistry, lit, vector};

use super::{CommandResult, emit, group, load};
use crate::cli::JoinKind;

#[allow(clippy::too_many_arguments)]
pub fn run(
    left: PathBuf,
    right: PathBuf,
    how: JoinKind,
    by: Vec<String>,
    suffix: Option<Vec<String>>,
    keep: bool,
    group_by: Vec<String>,
    output: Option<PathBuf>,
) -> CommandResult {
    let registry = VerbRegistry::with_defaults();
    let x = group(&registry, load(&left, &[])?, &group_by)?;
    let y = load(&right, &[])?;

    let mut call = VerbCall::new(how.verb()).with_other(y);
    if !by.is_empty() {
        let selector = if by.iter().any(|k| k.contains('=')) {
            let mapping: Vec<(&str, &str)> = by
                .iter()
                .map(|k| k.split_once('=').unwrap_or((k.as_str(), k.as_str())))
                .collect();
            pairs(&mapping)
        } else {
            all_of(&by)
        };
        call = call.arg(Arg::param("by", Expr::Select(selector)));
    }
    if how.takes_suffix() {
        if let Some(suffix) = suffix {
            call = call.arg(Arg::param("suffix", vector(suffix)));
        }
    } else if suffix.is_some() {
        return Err(format!("--suffix does not apply to a {} join", how).into());
    }
    if keep && !matches!(how, JoinKind::Semi | JoinKind::Anti) {
        call = call.arg(Arg::param("keep", lit(true)));
    }

    let joined = registry.call(&x, &call)?;
    emit(&joined, output)
}
