//! Shared result types for command output.

mod row_set;

pub use row_set::RowSet;
