//! Argument evaluation: contexts, selectors, expressions and the function
//! library.

pub mod context;
pub mod datum;
pub mod evaluator;
pub mod expr;
pub mod functions;
pub mod selector;

pub use context::{DOTS, EvalContext, ParamSpec, VerbSignature};
pub use datum::{Datum, GroupScalars, GroupedColumn};
pub use evaluator::{Evaluator, Resolved};
pub use expr::{BinaryOp, Expr, call, col, lit, vector};
pub use functions::function_names;
pub use selector::{
    ColumnPredicate, Selector, all_of, any_of, contains, ends_with, everything, exclude, is_numeric,
    last_col, matches, num_range, pairs, starts_with, where_,
};
