use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ToolError};
use crate::reference::column::{MAX_COLUMN, col_name_to_index, index_to_col_name};

/// A single cell address such as `B5`.
///
/// Both coordinates are 1-based. Ordering is row-major, so sorting
/// references walks a range top row first, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    row: u32,
    col: u32,
}

impl CellRef {
    /// Builds a reference from 1-based coordinates.
    pub fn new(row: u32, col: u32) -> Option<Self> {
        (row >= 1 && (1..=MAX_COLUMN).contains(&col)).then_some(Self { row, col })
    }

    /// For coordinates taken from other valid references.
    pub(super) fn within_bounds(row: u32, col: u32) -> Self {
        debug_assert!(Self::new(row, col).is_some());
        Self { row, col }
    }

    /// Parses `B5`, `b5` or `$B$5`.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || ToolError::InvalidRange(input.to_string());
        let text = input.trim();

        let rest = text.strip_prefix('$').unwrap_or(text);
        let letters_end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let (letters, rest) = rest.split_at(letters_end);
        let digits = rest.strip_prefix('$').unwrap_or(rest);

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let col = col_name_to_index(letters).ok_or_else(invalid)?;
        let row: u32 = digits.parse().map_err(|_| invalid())?;

        Self::new(row, col).ok_or_else(invalid)
    }

    /// 1-based row number.
    pub fn row(&self) -> u32 {
        self.row
    }

    /// 1-based column index.
    pub fn col(&self) -> u32 {
        self.col
    }

    pub fn column_letters(&self) -> String {
        index_to_col_name(self.col)
    }

    /// 1-based `(row, column)` pair.
    pub fn coordinates(&self) -> (u32, u32) {
        (self.row, self.col)
    }

    /// 0-based `(row, column)` as the workbook engine addresses cells.
    pub fn zero_based(&self) -> (u32, u16) {
        // col is capped at MAX_COLUMN, which fits in u16
        (self.row - 1, (self.col - 1) as u16)
    }

    /// Inverse of [`CellRef::zero_based`].
    pub fn from_zero_based(row: u32, col: u16) -> Option<Self> {
        Self::new(row.checked_add(1)?, u32::from(col) + 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letters(), self.row)
    }
}

impl FromStr for CellRef {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_absolute_references() {
        let cell = CellRef::parse("B5").unwrap();
        assert_eq!(cell.coordinates(), (5, 2));
        assert_eq!(cell.zero_based(), (4, 1));
        assert_eq!(cell.column_letters(), "B");

        assert_eq!(CellRef::parse("$AA$10").unwrap().coordinates(), (10, 27));
        assert_eq!(CellRef::parse("aa10").unwrap().to_string(), "AA10");
        assert_eq!(CellRef::parse(" C3 ").unwrap().to_string(), "C3");
        assert_eq!(CellRef::parse("XFD1048576").unwrap().coordinates(), (1_048_576, 16_384));
    }

    #[test]
    fn rejects_malformed_references() {
        for bad in ["", "5", "B", "B0", "1B", "B-1", "B5C", "XFE1", "B$$5", "$$B5", "B 5", "B99999999999"] {
            let err = CellRef::parse(bad).unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidRange(_)),
                "expected invalid range for {bad:?}"
            );
        }
    }

    #[test]
    fn ordering_is_row_major() {
        let mut cells = vec![
            CellRef::parse("A2").unwrap(),
            CellRef::parse("B1").unwrap(),
            CellRef::parse("A1").unwrap(),
        ];
        cells.sort();
        let names: Vec<String> = cells.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["A1", "B1", "A2"]);
    }

    #[test]
    fn zero_based_round_trip() {
        let cell = CellRef::parse("H20").unwrap();
        let (row, col) = cell.zero_based();
        assert_eq!(CellRef::from_zero_based(row, col), Some(cell));
    }
}
