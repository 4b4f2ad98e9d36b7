//! A1-style cell and range references.

mod cell;
mod column;
mod range;

pub use cell::CellRef;
pub use column::{MAX_COLUMN, col_name_to_index, index_to_col_name};
pub use range::{RangeRef, is_valid_range_reference};
