use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use calamine::{Data, Dimensions, Range, Reader, Xlsx};
use log::{debug, warn};
use rust_xlsxwriter::{Format, Formula, Workbook as XlsxWorkbook, Worksheet};
use tempfile::NamedTempFile;

use crate::error::{Result, ToolError};
use crate::excel::package::{SheetNumberFormats, read_package_layout};
use crate::excel::{Cell, CellValue, DefinedName, Sheet, SheetVisibility};
use crate::reference::{CellRef, RangeRef};

/// Format given to date cells that carry no number format of their own.
const DEFAULT_DATE_FORMAT: &str = "yyyy-mm-dd";

/// An in-memory workbook: every sheet is read on open and nothing touches
/// the file again until [`Workbook::save`].
#[derive(Clone, Debug)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    defined_names: Vec<DefinedName>,
    file_path: PathBuf,
}

/// Reads every sheet of an xlsx file, with the number formats, column
/// layout, merges, visibility and defined names a save has to write back.
pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<Workbook> {
    let path = path.as_ref();

    let mut workbook: Xlsx<BufReader<File>> = calamine::open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    if sheet_names.is_empty() {
        return Err(calamine::Error::Msg("No worksheets found in file").into());
    }

    // A layout that cannot be read would be dropped by the next save.
    let mut layout = read_package_layout(path)?;

    let visibility: HashMap<String, SheetVisibility> = workbook
        .sheets_metadata()
        .iter()
        .map(|meta| (meta.name.clone(), SheetVisibility::from(meta.visible)))
        .collect();

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in &sheet_names {
        let values = workbook.worksheet_range(name)?;
        let formulas = workbook.worksheet_formula(name)?;
        let merges = workbook
            .worksheet_merge_cells(name)
            .transpose()?
            .unwrap_or_default();
        let sheet_layout = layout.sheets.remove(name).unwrap_or_default();

        let mut sheet = create_sheet(name, &values, &formulas, sheet_layout.number_formats);
        sheet.visibility = visibility.get(name).copied().unwrap_or_default();
        for dimensions in &merges {
            match merged_range(dimensions) {
                Some(range) => sheet.add_merged_range(range),
                None => warn!("Ignoring merged region outside the sheet on '{name}'"),
            }
        }
        for (col, column) in sheet_layout.columns {
            sheet.set_column_layout(col, column);
        }

        debug!(
            "loaded sheet '{name}' with {} cells, {} merges",
            sheet.len(),
            sheet.merged_ranges().len()
        );
        sheets.push(sheet);
    }

    Ok(Workbook {
        sheets,
        defined_names: layout.defined_names,
        file_path: path.to_path_buf(),
    })
}

fn merged_range(dimensions: &Dimensions) -> Option<RangeRef> {
    let corner = |(row, col): (u32, u32)| CellRef::from_zero_based(row, u16::try_from(col).ok()?);
    Some(RangeRef::new(corner(dimensions.start)?, corner(dimensions.end)?))
}

/// Pixel width of a column stored as `width` characters (Calibri 11).
fn column_pixels(width: f64) -> u16 {
    (width * 7.0).round().clamp(0.0, f64::from(u16::MAX)) as u16
}

/// Absolute 0-based coordinates of every used cell of a calamine range.
fn used_cells<T>(range: &Range<T>) -> impl Iterator<Item = (u32, u16, &T)>
where
    T: calamine::CellType + PartialEq,
{
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    range.used_cells().map(move |(row, col, value)| {
        (
            start_row + row as u32,
            (start_col as usize + col) as u16,
            value,
        )
    })
}

fn create_sheet(
    name: &str,
    values: &Range<Data>,
    formulas: &Range<String>,
    formats: SheetNumberFormats,
) -> Sheet {
    let mut sheet = Sheet::new(name);

    for (row, col, data) in used_cells(values) {
        sheet.insert_at(row, col, Cell::new(CellValue::from(data)));
    }

    // A formula replaces the cached result calamine reports as the value.
    for (row, col, formula) in used_cells(formulas) {
        if formula.is_empty() {
            continue;
        }
        let text = if formula.starts_with('=') {
            formula.clone()
        } else {
            format!("={formula}")
        };
        sheet.cell_at_mut(row, col).value = CellValue::Formula(text);
    }

    for ((row, col), number_format) in formats {
        sheet.cell_at_mut(row, col).number_format = Some(number_format);
    }

    sheet
}

/// One rust_xlsxwriter format per distinct number-format code.
struct FormatCache {
    general: Format,
    by_code: HashMap<String, Format>,
}

impl FormatCache {
    fn new() -> Self {
        Self {
            general: Format::new(),
            by_code: HashMap::new(),
        }
    }

    fn get(&mut self, code: Option<&str>) -> &Format {
        match code {
            None | Some("") | Some("General") => &self.general,
            Some(code) => self
                .by_code
                .entry(code.to_string())
                .or_insert_with(|| Format::new().set_num_format(code)),
        }
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    (row, col): (u32, u16),
    cell: &Cell,
    formats: &mut FormatCache,
) -> Result<()> {
    let code = match (&cell.number_format, &cell.value) {
        (Some(code), _) => Some(code.as_str()),
        (None, CellValue::DateTime(_)) => Some(DEFAULT_DATE_FORMAT),
        (None, _) => None,
    };
    let format = formats.get(code);

    match &cell.value {
        CellValue::Empty => {
            if code.is_some() {
                worksheet.write_blank(row, col, format)?;
            }
        }
        CellValue::Text(text) | CellValue::Error(text) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
        CellValue::Number(n) | CellValue::DateTime(n) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        CellValue::Boolean(b) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        CellValue::Formula(formula) => {
            worksheet.write_formula_with_format(row, col, Formula::new(formula), format)?;
        }
    }

    Ok(())
}

/// Column widths, hidden columns and merged ranges. Runs before the cells
/// are written, since a merge fills its range with blanks.
fn write_layout(worksheet: &mut Worksheet, sheet: &Sheet, formats: &mut FormatCache) -> Result<()> {
    for (col, layout) in sheet.columns() {
        if let Some(width) = layout.width {
            worksheet.set_column_width_pixels(col, column_pixels(width))?;
        }
        if layout.hidden {
            worksheet.set_column_hidden(col)?;
        }
    }

    for range in sheet.merged_ranges() {
        let code = sheet
            .get(range.start())
            .and_then(|cell| cell.number_format.as_deref());
        let (first_row, first_col) = range.start().zero_based();
        let (last_row, last_col) = range.end().zero_based();
        worksheet.merge_range(first_row, first_col, last_row, last_col, "", formats.get(code))?;
    }

    Ok(())
}

/// Replaces `dest` with `bytes` through a sibling temp file, so a failed
/// write leaves the original file in place.
fn write_atomically(dest: &Path, bytes: &[u8]) -> Result<()> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest)?;

    Ok(())
}

impl Workbook {
    pub fn get_file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn get_sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Position of the sheet with exactly this name.
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|sheet| sheet.name == name)
    }

    /// Whether a sheet name is taken; Excel compares names case-insensitively.
    pub fn has_sheet_named(&self, name: &str) -> bool {
        self.sheets
            .iter()
            .any(|sheet| sheet.name.to_lowercase() == name.to_lowercase())
    }

    pub fn get_sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn get_sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .iter_mut()
            .find(|sheet| sheet.name == name)
            .ok_or_else(|| ToolError::SheetNotFound(name.to_string()))
    }

    /// Inserts a sheet at `index` (past the end appends) and returns the
    /// position it ended up at.
    pub fn insert_sheet_at_index(&mut self, sheet: Sheet, index: Option<usize>) -> Result<usize> {
        if self.has_sheet_named(&sheet.name) {
            return Err(ToolError::SheetAlreadyExists(sheet.name));
        }

        let len = self.sheets.len();
        let position = match index {
            Some(index) if index > len => {
                warn!("Sheet index {index} is past the last position {len}; appending");
                len
            }
            Some(index) => index,
            None => len,
        };

        self.sheets.insert(position, sheet);
        Ok(position)
    }

    pub fn defined_names(&self) -> &[DefinedName] {
        &self.defined_names
    }

    /// Writes every sheet back to the file the workbook was opened from.
    pub fn save(&self) -> Result<()> {
        let mut workbook = XlsxWorkbook::new();
        let mut formats = FormatCache::new();
        let first_visible = self.sheets.iter().position(Sheet::is_visible);

        for (index, sheet) in self.sheets.iter().enumerate() {
            let worksheet = workbook.add_worksheet().set_name(&sheet.name)?;

            write_layout(worksheet, sheet, &mut formats)?;
            for (position, cell) in sheet.cells() {
                write_cell(worksheet, position, cell, &mut formats)?;
            }

            // Excel opens on the active sheet, which must be a visible one.
            match sheet.visibility {
                SheetVisibility::Hidden => {
                    worksheet.set_hidden(true);
                }
                SheetVisibility::VeryHidden => {
                    worksheet.set_very_hidden(true);
                }
                SheetVisibility::Visible if first_visible == Some(index) => {
                    worksheet.set_active(true);
                }
                SheetVisibility::Visible => {}
            }
        }

        for name in &self.defined_names {
            workbook.define_name(name.qualified_name(), &name.formula)?;
        }

        let buffer = workbook.save_to_buffer()?;
        write_atomically(&self.file_path, &buffer)?;
        debug!(
            "saved {} ({} bytes, {} sheets)",
            self.file_path.display(),
            buffer.len(),
            self.sheets.len()
        );

        Ok(())
    }
}
