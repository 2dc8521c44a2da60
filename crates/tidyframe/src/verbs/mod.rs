//! Table verbs and the registry that dispatches them by grouping kind.

pub mod complete;
pub mod core;
pub mod join;
pub mod rank;
pub mod registry;

pub use complete::{CompleteSpec, complete};
pub use core::{Selection, SummariseGroups, filter, group_by, mutate, rowwise, select, summarise, ungroup};
pub use join::{
    JoinBy, JoinOptions, NEST_COLUMN, anti_join, full_join, inner_join, left_join, nest_join, right_join, semi_join,
};
pub use rank::{RankInput, cume_dist, min_rank, ntile, percent_rank, rank, row_number};
pub use registry::{Arg, Bound, BoundArg, BoundArgs, VerbCall, VerbFn, VerbRegistry};
