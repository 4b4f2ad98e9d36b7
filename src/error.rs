//! Error types shared by every tool.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`ToolError`]
pub type Result<T> = std::result::Result<T, ToolError>;

/// Everything that can stop a tool before its workbook is saved.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Only `.xlsx` workbooks can be written back
    #[error("Unsupported file format: {} (expected .xlsx)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Invalid range reference: {0}")]
    InvalidRange(String),

    #[error("Invalid sheet name: '{name}' ({reason}). Suggested: '{suggestion}'")]
    InvalidSheetName {
        name: String,
        reason: String,
        suggestion: String,
    },

    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("Sheet '{0}' already exists")]
    SheetAlreadyExists(String),

    #[error("Either --format or --custom-format must be specified")]
    MissingFormat,

    #[error("Source sheet '{0}' not found")]
    SourceSheetNotFound(String),

    /// Row past the last row a worksheet can hold
    #[error("Row {row} is beyond the worksheet limit of {max} rows")]
    RowOutOfBounds { row: u32, max: u32 },

    #[error("Range {range} covers {cells} cells, more than the limit of {max}")]
    RangeTooLarge { range: String, cells: u64, max: u64 },

    #[error("Unable to read workbook: {0}")]
    Read(#[from] calamine::Error),

    #[error("Unable to read workbook package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Unable to parse workbook XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Unable to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Stable category string reported as `error_type`.
    pub fn category(&self) -> &'static str {
        match self {
            ToolError::FileNotFound(_) => "file-not-found",
            ToolError::UnsupportedFormat(_) => "unsupported-file-format",
            ToolError::InvalidRange(_)
            | ToolError::RowOutOfBounds { .. }
            | ToolError::RangeTooLarge { .. } => "invalid-range-reference",
            ToolError::InvalidSheetName { .. } => "invalid-sheet-name",
            ToolError::SheetNotFound(_) => "sheet-not-found",
            ToolError::SheetAlreadyExists(_) => "sheet-already-exists",
            ToolError::MissingFormat => "missing-format-specification",
            ToolError::SourceSheetNotFound(_) => "source-sheet-not-found",
            ToolError::Read(_) | ToolError::Zip(_) | ToolError::Xml(_) => "workbook-read-error",
            ToolError::Write(_) => "workbook-write-error",
            ToolError::Io(_) => "io-error",
        }
    }

    /// Replacement name proposed for an invalid sheet name, if any.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ToolError::InvalidSheetName { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }
}

impl From<calamine::XlsxError> for ToolError {
    fn from(err: calamine::XlsxError) -> Self {
        ToolError::Read(calamine::Error::Xlsx(err))
    }
}

impl From<tempfile::PersistError> for ToolError {
    fn from(err: tempfile::PersistError) -> Self {
        ToolError::Io(err.error)
    }
}
