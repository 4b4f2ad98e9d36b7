//! Validated, scriptable mutations of Excel workbooks.
//!
//! The library holds the reference parsing, formula templating, number
//! format and sheet-name rules shared by the `excel-*` command-line tools,
//! plus the commands themselves.

pub mod commands;
pub mod error;
pub mod excel;
pub mod formula;
pub mod number_format;
pub mod output;
pub mod reference;
pub mod sheet_name;

pub use error::{Result, ToolError};
