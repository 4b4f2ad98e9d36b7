use std::path::PathBuf;

use log::info;
use serde::Serialize;

use crate::commands::{Report, STATUS_SUCCESS, check_workbook_file};
use crate::error::Result;
use crate::excel::{Sheet, open_workbook};
use crate::number_format::{FormatKind, FormatSpec};
use crate::reference::RangeRef;

#[derive(Debug, Clone)]
pub struct FormatRangeOptions {
    pub file: PathBuf,
    pub sheet: String,
    pub range: String,
    pub format: Option<FormatKind>,
    /// Literal number format; takes precedence over `format`
    pub custom_format: Option<String>,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatRangeReport {
    pub status: &'static str,
    pub file: String,
    pub sheet: String,
    pub range: String,
    pub cells_formatted: u64,
    pub format_type: &'static str,
    pub format_string: String,
}

impl Report for FormatRangeReport {
    fn summary_lines(&self) -> Vec<String> {
        vec![
            format!(
                "Formatted {} cells in {}",
                self.cells_formatted, self.range
            ),
            format!("   Format: {}", self.format_string),
        ]
    }
}

/// Applies one number format to every cell of the range and saves.
pub fn format_range(options: &FormatRangeOptions) -> Result<FormatRangeReport> {
    check_workbook_file(&options.file)?;
    let range = RangeRef::parse(&options.range)?;
    Sheet::check_range(&range)?;
    let spec = FormatSpec::from_options(
        options.format,
        options.custom_format.as_deref(),
        options.decimals,
    )?;
    let number_format = spec.resolve();

    let mut workbook = open_workbook(&options.file)?;
    let sheet = workbook.get_sheet_mut(&options.sheet)?;

    let mut cells_formatted = 0;
    for cell in range.cells() {
        sheet.set_number_format(cell, &number_format);
        cells_formatted += 1;
    }

    workbook.save()?;
    info!(
        "formatted {cells_formatted} cells of {range} on '{}' as '{number_format}'",
        options.sheet
    );

    Ok(FormatRangeReport {
        status: STATUS_SUCCESS,
        file: options.file.display().to_string(),
        sheet: options.sheet.clone(),
        range: range.to_string(),
        cells_formatted,
        format_type: spec.type_name(),
        format_string: number_format,
    })
}
