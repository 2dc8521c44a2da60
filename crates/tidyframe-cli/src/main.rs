//! tidyframe CLI - grouping-aware verbs over delimited files.

mod cli;
mod commands;

use std::path::PathBuf;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let output: Option<PathBuf> = cli.output_file;
    let result = match cli.command {
        Commands::Groups {
            file,
            by,
            sort,
            dropna,
            json,
        } => commands::groups::run(file, by, sort, dropna, json, output),

        Commands::Rank {
            file,
            function,
            column,
            by,
            n,
            output: name,
        } => commands::rank::run(file, function, column, by, n, name, output),

        Commands::Join {
            left,
            right,
            how,
            by,
            suffix,
            keep,
            group_by,
        } => commands::join::run(left, right, how, by, suffix, keep, group_by, output),

        Commands::Complete {
            file,
            columns,
            by,
            categorical,
        } => commands::complete::run(file, columns, by, categorical, output),

        Commands::Select {
            file,
            columns,
            matches,
            starts_with,
        } => commands::select::run(file, columns, matches, starts_with, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
