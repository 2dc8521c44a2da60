//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tidyframe: grouping-aware verbs over delimited files
#[derive(Parser)]
#[command(name = "tidyframe")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write the result to this file instead of stdout (.tsv for tab-separated)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub output_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the group keys and group sizes of a file
    Groups {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Grouping columns
        #[arg(long, value_delimiter = ',', required = true)]
        by: Vec<String>,

        /// Order groups by key instead of by first appearance
        #[arg(long)]
        sort: bool,

        /// Drop rows with a missing key
        #[arg(long)]
        dropna: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a ranking column, optionally within groups
    Rank {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Ranking function (row_number, min_rank, rank, ntile, percent_rank, cume_dist)
        #[arg(long = "fn", default_value = "min_rank")]
        function: String,

        /// Column to rank
        #[arg(short, long)]
        column: String,

        /// Grouping columns
        #[arg(long, value_delimiter = ',')]
        by: Vec<String>,

        /// Number of buckets for ntile
        #[arg(short, long)]
        n: Option<i64>,

        /// Name of the new column (default: <fn>_<column>)
        #[arg(long)]
        output: Option<String>,
    },

    /// Join two files
    Join {
        /// Left data file
        #[arg(value_name = "LEFT")]
        left: PathBuf,

        /// Right data file
        #[arg(value_name = "RIGHT")]
        right: PathBuf,

        /// Join kind
        #[arg(long, default_value = "inner")]
        how: JoinKind,

        /// Key columns; use left=right for differently named keys
        #[arg(long, value_delimiter = ',')]
        by: Vec<String>,

        /// Suffixes for clashing columns, e.g. _x,_y
        #[arg(long, value_delimiter = ',', num_args = 2)]
        suffix: Option<Vec<String>>,

        /// Keep the key columns of both tables
        #[arg(long)]
        keep: bool,

        /// Group the left table by these columns first
        #[arg(long, value_delimiter = ',')]
        group_by: Vec<String>,
    },

    /// Add rows for missing combinations of values
    Complete {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Columns to expand
        #[arg(long, value_delimiter = ',', required = true)]
        columns: Vec<String>,

        /// Expand within groups of these columns
        #[arg(long, value_delimiter = ',')]
        by: Vec<String>,

        /// Read these columns as categorical so unused levels are expanded too
        #[arg(long, value_delimiter = ',')]
        categorical: Vec<String>,
    },

    /// Keep a subset of columns
    Select {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column names
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Columns whose name matches this regex
        #[arg(long)]
        matches: Option<String>,

        /// Columns whose name starts with this prefix
        #[arg(long)]
        starts_with: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, Default)]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
    Semi,
    Anti,
    Nest,
}

impl JoinKind {
    /// Name of the registry verb.
    pub fn verb(&self) -> &'static str {
        match self {
            JoinKind::Inner => "inner_join",
            JoinKind::Left => "left_join",
            JoinKind::Right => "right_join",
            JoinKind::Full => "full_join",
            JoinKind::Semi => "semi_join",
            JoinKind::Anti => "anti_join",
            JoinKind::Nest => "nest_join",
        }
    }

    /// Whether the verb accepts `suffix`.
    pub fn takes_suffix(&self) -> bool {
        matches!(self, JoinKind::Inner | JoinKind::Left | JoinKind::Right | JoinKind::Full)
    }
}

impl std::str::FromStr for JoinKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inner" => Ok(JoinKind::Inner),
            "left" => Ok(JoinKind::Left),
            "right" => Ok(JoinKind::Right),
            "full" | "outer" => Ok(JoinKind::Full),
            "semi" => Ok(JoinKind::Semi),
            "anti" => Ok(JoinKind::Anti),
            "nest" => Ok(JoinKind::Nest),
            _ => Err(format!(
                "Unknown join: {}. Use inner, left, right, full, semi, anti, or nest.",
                s
            )),
        }
    }
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.verb().trim_end_matches("_join"))
    }
}
