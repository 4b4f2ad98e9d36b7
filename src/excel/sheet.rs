use std::collections::BTreeMap;

use crate::error::{Result, ToolError};
use crate::excel::{Cell, CellValue};
use crate::reference::{CellRef, RangeRef};

/// Last row a worksheet can hold.
pub const MAX_ROWS: u32 = 1_048_576;

/// Most cells one command may write or format.
pub const MAX_RANGE_CELLS: u64 = 5_000_000;

/// Whether a sheet's tab is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SheetVisibility {
    #[default]
    Visible,
    Hidden,
    /// Hidden and not listed in Excel's unhide dialog
    VeryHidden,
}

impl From<calamine::SheetVisible> for SheetVisibility {
    fn from(visible: calamine::SheetVisible) -> Self {
        match visible {
            calamine::SheetVisible::Visible => SheetVisibility::Visible,
            calamine::SheetVisible::Hidden => SheetVisibility::Hidden,
            calamine::SheetVisible::VeryHidden => SheetVisibility::VeryHidden,
        }
    }
}

/// Width and visibility of one column.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColumnLayout {
    /// Width in character units, as stored in the file
    pub width: Option<f64>,
    pub hidden: bool,
}

/// A named worksheet holding only its non-blank cells.
///
/// Cells are keyed by 0-based `(row, col)`, so iteration is row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub visibility: SheetVisibility,
    cells: BTreeMap<(u32, u16), Cell>,
    merged: Vec<RangeRef>,
    columns: BTreeMap<u16, ColumnLayout>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: SheetVisibility::Visible,
            cells: BTreeMap::new(),
            merged: Vec::new(),
            columns: BTreeMap::new(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == SheetVisibility::Visible
    }

    pub fn get(&self, cell: CellRef) -> Option<&Cell> {
        self.cells.get(&cell.zero_based())
    }

    pub fn value(&self, cell: CellRef) -> Option<&CellValue> {
        self.get(cell).map(|c| &c.value)
    }

    /// Writes a value, keeping whatever number format the cell already has.
    pub fn set_value(&mut self, cell: CellRef, value: CellValue) {
        let entry = self.cells.entry(cell.zero_based()).or_insert_with(Cell::empty);
        entry.value = value;
        if entry.is_blank() {
            self.cells.remove(&cell.zero_based());
        }
    }

    /// Applies a number format, keeping the cell's value.
    pub fn set_number_format(&mut self, cell: CellRef, number_format: &str) {
        self.cells
            .entry(cell.zero_based())
            .or_insert_with(Cell::empty)
            .number_format = Some(number_format.to_string());
    }

    /// Stores a cell at 0-based coordinates, as read from a file.
    pub(crate) fn insert_at(&mut self, row: u32, col: u16, cell: Cell) {
        if cell.is_blank() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), cell);
        }
    }

    pub(crate) fn cell_at_mut(&mut self, row: u32, col: u16) -> &mut Cell {
        self.cells.entry((row, col)).or_insert_with(Cell::empty)
    }

    /// Non-blank cells in row-major order with 0-based coordinates.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u16), &Cell)> {
        self.cells.iter().map(|(pos, cell)| (*pos, cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn merged_ranges(&self) -> &[RangeRef] {
        &self.merged
    }

    /// Records a merged block; single cells are not merges and are ignored.
    pub fn add_merged_range(&mut self, range: RangeRef) {
        if !range.is_single_cell() && !self.merged.contains(&range) {
            self.merged.push(range);
        }
    }

    /// Columns with a non-default layout, keyed by 0-based index.
    pub fn columns(&self) -> impl Iterator<Item = (u16, &ColumnLayout)> {
        self.columns.iter().map(|(col, layout)| (*col, layout))
    }

    pub fn set_column_layout(&mut self, col: u16, layout: ColumnLayout) {
        if layout == ColumnLayout::default() {
            self.columns.remove(&col);
        } else {
            self.columns.insert(col, layout);
        }
    }

    /// A visible copy of every cell, merge and column layout under a new name.
    pub fn duplicate(&self, name: impl Into<String>) -> Sheet {
        Sheet {
            name: name.into(),
            visibility: SheetVisibility::Visible,
            cells: self.cells.clone(),
            merged: self.merged.clone(),
            columns: self.columns.clone(),
        }
    }

    /// Fails when the range reaches past the last addressable row or
    /// covers more than [`MAX_RANGE_CELLS`] cells.
    pub fn check_range(range: &RangeRef) -> Result<()> {
        let row = range.end().row();
        if row > MAX_ROWS {
            return Err(ToolError::RowOutOfBounds { row, max: MAX_ROWS });
        }

        let cells = range.cell_count();
        if cells > MAX_RANGE_CELLS {
            return Err(ToolError::RangeTooLarge {
                range: range.to_string(),
                cells,
                max: MAX_RANGE_CELLS,
            });
        }
        Ok(())
    }
}
