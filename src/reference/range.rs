use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ToolError};
use crate::reference::cell::CellRef;

/// A rectangular block of cells such as `A1:B10`.
///
/// The start cell is always the top-left corner and the end cell the
/// bottom-right one, whatever order the corners were given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeRef {
    start: CellRef,
    end: CellRef,
}

impl RangeRef {
    /// Builds a range from any two opposite corners.
    pub fn new(a: CellRef, b: CellRef) -> Self {
        let (top, bottom) = (a.row().min(b.row()), a.row().max(b.row()));
        let (left, right) = (a.col().min(b.col()), a.col().max(b.col()));

        // Both corners were valid, so their min/max combinations are too.
        Self {
            start: CellRef::within_bounds(top, left),
            end: CellRef::within_bounds(bottom, right),
        }
    }

    /// Parses `A1:B10` or a single cell `A1`.
    pub fn parse(input: &str) -> Result<Self> {
        let text = input.trim();
        let invalid = || ToolError::InvalidRange(input.to_string());

        let mut parts = text.split(':');
        let first = parts.next().ok_or_else(invalid)?;
        let second = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let start = CellRef::parse(first).map_err(|_| invalid())?;
        let end = match second {
            Some(second) => CellRef::parse(second).map_err(|_| invalid())?,
            None => start,
        };

        Ok(Self::new(start, end))
    }

    pub fn start(&self) -> CellRef {
        self.start
    }

    pub fn end(&self) -> CellRef {
        self.end
    }

    pub fn rows(&self) -> u32 {
        self.end.row() - self.start.row() + 1
    }

    pub fn cols(&self) -> u32 {
        self.end.col() - self.start.col() + 1
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.rows()) * u64::from(self.cols())
    }

    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// Every cell of the range, top row first and left to right within a row.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        let (start_col, end_col) = (self.start.col(), self.end.col());
        (self.start.row()..=self.end.row()).flat_map(move |row| {
            (start_col..=end_col).map(move |col| CellRef::within_bounds(row, col))
        })
    }
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

impl FromStr for RangeRef {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Whether `input` parses as a cell or range reference.
pub fn is_valid_range_reference(input: &str) -> bool {
    RangeRef::parse(input).is_ok()
}
