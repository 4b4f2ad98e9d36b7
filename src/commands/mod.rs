//! The three workbook mutations, each as validate -> mutate -> save.
//!
//! Nothing is written unless every check and the mutation itself succeed,
//! so a failed command leaves the workbook file exactly as it was.

mod add_sheet;
mod apply_range_formula;
mod format_range;

use std::path::Path;

use serde::Serialize;

use crate::error::{Result, ToolError};

pub use add_sheet::{AddSheetOptions, AddSheetReport, add_sheet};
pub use apply_range_formula::{
    ApplyRangeFormulaOptions, ApplyRangeFormulaReport, apply_range_formula,
};
pub use format_range::{FormatRangeOptions, FormatRangeReport, format_range};

/// Value of the `status` field of every successful report.
pub const STATUS_SUCCESS: &str = "success";

/// A command's success record.
pub trait Report: Serialize {
    /// Human-readable lines printed instead of JSON.
    fn summary_lines(&self) -> Vec<String>;
}

/// The file must exist and be an `.xlsx` workbook.
pub(crate) fn check_workbook_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(ToolError::FileNotFound(path.to_path_buf()));
    }

    let is_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if !is_xlsx {
        return Err(ToolError::UnsupportedFormat(path.to_path_buf()));
    }

    Ok(())
}
