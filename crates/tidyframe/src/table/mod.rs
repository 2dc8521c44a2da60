//! Columnar storage: values, columns, tables and the two primitives the
//! grouping layer builds on (ranking and hash joins).

pub mod column;
pub mod frame;
pub mod merge;
pub mod rank;
pub mod value;

pub use column::{Column, DType};
pub use frame::Table;
pub use merge::{JoinHow, KeyOutput, MergeSpec, join_indices, match_flags, merge};
pub use rank::{NaOption, RankMethod, rank};
pub use value::Value;
