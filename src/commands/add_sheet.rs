use std::path::PathBuf;

use log::info;
use serde::Serialize;

use crate::commands::{Report, STATUS_SUCCESS, check_workbook_file};
use crate::error::{Result, ToolError};
use crate::excel::{Sheet, open_workbook};
use crate::sheet_name::validate_sheet_name;

#[derive(Debug, Clone)]
pub struct AddSheetOptions {
    pub file: PathBuf,
    pub sheet: String,
    /// 0-based position; `None` appends
    pub index: Option<usize>,
    /// Existing sheet whose cells are copied into the new one
    pub copy_from: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddSheetReport {
    pub status: &'static str,
    pub file: String,
    pub sheet: String,
    pub index: usize,
    pub all_sheets: Vec<String>,
    pub copied_from: Option<String>,
}

impl Report for AddSheetReport {
    fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Added sheet: {}", self.sheet),
            format!("   Position: {}", self.index),
            format!("   All sheets: {}", self.all_sheets.join(", ")),
        ];
        if let Some(source) = &self.copied_from {
            lines.push(format!("   Copied from: {source}"));
        }
        lines
    }
}

/// Adds a blank sheet, or a copy of `copy_from`, and saves the workbook.
pub fn add_sheet(options: &AddSheetOptions) -> Result<AddSheetReport> {
    check_workbook_file(&options.file)?;
    validate_sheet_name(&options.sheet)?;

    let mut workbook = open_workbook(&options.file)?;

    if workbook.has_sheet_named(&options.sheet) {
        return Err(ToolError::SheetAlreadyExists(options.sheet.clone()));
    }

    let new_sheet = match &options.copy_from {
        Some(source) => workbook
            .get_sheet(source)
            .ok_or_else(|| ToolError::SourceSheetNotFound(source.clone()))?
            .duplicate(options.sheet.as_str()),
        None => Sheet::new(options.sheet.as_str()),
    };

    let index = workbook.insert_sheet_at_index(new_sheet, options.index)?;
    workbook.save()?;

    info!(
        "added sheet '{}' at position {index} in {}",
        options.sheet,
        options.file.display()
    );

    Ok(AddSheetReport {
        status: STATUS_SUCCESS,
        file: options.file.display().to_string(),
        sheet: options.sheet.clone(),
        index,
        all_sheets: workbook.get_sheet_names(),
        copied_from: options.copy_from.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_mentions_copy_source_only_when_copied() {
        let mut report = AddSheetReport {
            status: STATUS_SUCCESS,
            file: "model.xlsx".to_string(),
            sheet: "Q2".to_string(),
            index: 1,
            all_sheets: vec!["Q1".to_string(), "Q2".to_string()],
            copied_from: None,
        };
        assert_eq!(
            report.summary_lines(),
            ["Added sheet: Q2", "   Position: 1", "   All sheets: Q1, Q2"]
        );

        report.copied_from = Some("Q1".to_string());
        assert_eq!(report.summary_lines().last().unwrap(), "   Copied from: Q1");
    }

    #[test]
    fn invalid_name_fails_before_the_file_is_opened() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-really.xlsx");
        std::fs::write(&file, b"not a zip").unwrap();

        let err = add_sheet(&AddSheetOptions {
            file,
            sheet: "Bad/Name".to_string(),
            index: None,
            copy_from: None,
        })
        .unwrap_err();
        assert_eq!(err.suggestion(), Some("Bad_Name"));
    }
}
