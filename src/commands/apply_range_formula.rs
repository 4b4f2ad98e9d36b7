use std::path::PathBuf;

use indexmap::IndexMap;
use log::{debug, info};
use serde::Serialize;

use crate::commands::{Report, STATUS_SUCCESS, check_workbook_file};
use crate::error::Result;
use crate::excel::{CellValue, Sheet, open_workbook};
use crate::formula::FormulaTemplate;
use crate::reference::{CellRef, RangeRef};

#[derive(Debug, Clone)]
pub struct ApplyRangeFormulaOptions {
    pub file: PathBuf,
    pub sheet: String,
    pub range: String,
    /// Template with `{row}`, `{col}` or `{cell}` placeholders
    pub formula: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyRangeFormulaReport {
    pub status: &'static str,
    pub file: String,
    pub sheet: String,
    pub range: String,
    pub cells_modified: u64,
    pub formula_template: String,
    /// Formula written to the first cell and, for larger ranges, the last one
    pub sample_formulas: IndexMap<String, String>,
}

impl Report for ApplyRangeFormulaReport {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(
                "Applied formula to {} cells in {}",
                self.cells_modified, self.range
            ),
            format!("   Template: {}", self.formula_template),
        ];
        if let Some(sample) = self.sample_formulas.values().next() {
            lines.push(format!("   Sample: {sample}"));
        }
        lines
    }
}

fn written_text(sheet: &Sheet, cell: CellRef) -> String {
    match sheet.value(cell) {
        Some(CellValue::Formula(text) | CellValue::Text(text)) => text.clone(),
        _ => String::new(),
    }
}

/// Fills every cell of the range with the expanded template and saves.
pub fn apply_range_formula(options: &ApplyRangeFormulaOptions) -> Result<ApplyRangeFormulaReport> {
    check_workbook_file(&options.file)?;
    let range = RangeRef::parse(&options.range)?;
    Sheet::check_range(&range)?;
    let template = FormulaTemplate::new(&options.formula);
    if !template.has_placeholders() {
        debug!("template '{}' has no placeholders", template.source());
    }

    let mut workbook = open_workbook(&options.file)?;
    let sheet = workbook.get_sheet_mut(&options.sheet)?;

    let mut cells_modified = 0;
    for (cell, text) in template.expand(&range) {
        sheet.set_value(cell, CellValue::from_input(&text));
        cells_modified += 1;
    }
    debug!("wrote {cells_modified} cells of '{}'", options.sheet);

    let mut sample_formulas = IndexMap::new();
    sample_formulas.insert(
        range.start().to_string(),
        written_text(sheet, range.start()),
    );
    if !range.is_single_cell() {
        sample_formulas.insert(range.end().to_string(), written_text(sheet, range.end()));
    }

    workbook.save()?;
    info!(
        "applied '{}' to {range} on '{}' in {}",
        options.formula,
        options.sheet,
        options.file.display()
    );

    Ok(ApplyRangeFormulaReport {
        status: STATUS_SUCCESS,
        file: options.file.display().to_string(),
        sheet: options.sheet.clone(),
        range: range.to_string(),
        cells_modified,
        formula_template: options.formula.clone(),
        sample_formulas,
    })
}
