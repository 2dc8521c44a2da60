//! Grouping metadata: the row partition and the tables that carry it.

mod grouped;
mod index;

pub use grouped::{GroupedTable, GroupingKind};
pub use index::{GroupIndex, GroupOptions};

pub(crate) use index::cross_product;
