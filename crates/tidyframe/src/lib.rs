//! tidyframe: grouping-aware data-manipulation verbs for in-memory tables.
//!
//! A [`GroupedTable`] pairs a table with a grouping: none, a partition of
//! rows by the values of one or more columns, or one group per row. Verbs
//! such as `mutate`, `summarise` and the joins consume a grouped table and
//! return one whose grouping is re-derived from the input.
//!
//! # Core Principles
//!
//! - **Lazy grouping**: the group index is computed on first use and shared
//!   by shallow copies
//! - **Context-aware arguments**: every verb parameter declares whether it
//!   sees the whole table, one group at a time, or only column names
//! - **Grouping survives verbs**: results keep the grouping variables that
//!   are still present
//!
//! # Example
//!
//! ```no_run
//! use tidyframe::{Arg, GroupedTable, Parser, VerbCall, VerbRegistry, call, col};
//!
//! let table = Parser::new().parse_file("scores.csv").unwrap();
//! let registry = VerbRegistry::with_defaults();
//!
//! let grouped = registry
//!     .call(&GroupedTable::plain(table), &VerbCall::new("group_by").arg(Arg::new(col("team"))))
//!     .unwrap();
//! let ranked = registry
//!     .call(
//!         &grouped,
//!         &VerbCall::new("mutate").arg(Arg::named("rank", call("min_rank", vec![col("score")]))),
//!     )
//!     .unwrap();
//!
//! println!("{}", ranked.summary().unwrap_or_default());
//! ```

pub mod error;
pub mod eval;
pub mod group;
pub mod io;
pub mod table;
pub mod verbs;

pub use error::{Result, TidyError};
pub use eval::{EvalContext, Evaluator, Expr, Selector, call, col, lit, vector};
pub use group::{GroupIndex, GroupOptions, GroupedTable, GroupingKind};
pub use io::{Parser, ParserConfig};
pub use table::{Column, DType, Table, Value};
pub use verbs::{Arg, CompleteSpec, JoinBy, JoinOptions, SummariseGroups, VerbCall, VerbRegistry};
