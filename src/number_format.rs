//! Number-format strings for the named formats the tools understand.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::{Result, ToolError};

/// Largest number of fraction digits Excel accepts in a number format.
pub const MAX_DECIMALS: u8 = 30;

/// Fraction digits used when none are given.
pub const DEFAULT_DECIMALS: u8 = 2;

const DATE_FORMAT: &str = "mm/dd/yyyy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// `$#,##0.00` with red negatives in parentheses
    Currency,
    /// `0.00%`
    Percent,
    /// `#,##0.00`
    Number,
    /// Accounting layout with an aligned currency symbol
    Accounting,
    /// `mm/dd/yyyy`
    Date,
}

impl FormatKind {
    pub fn name(self) -> &'static str {
        match self {
            FormatKind::Currency => "currency",
            FormatKind::Percent => "percent",
            FormatKind::Number => "number",
            FormatKind::Accounting => "accounting",
            FormatKind::Date => "date",
        }
    }

    /// Builds the format string for this kind. `decimals` is ignored for dates.
    pub fn resolve(self, decimals: u8) -> String {
        let fraction = fraction_part(decimals);
        match self {
            FormatKind::Currency => format!("$#,##0{fraction}_);[Red]($#,##0{fraction})"),
            FormatKind::Percent => format!("0{fraction}%"),
            FormatKind::Number => format!("#,##0{fraction}"),
            FormatKind::Accounting => {
                let dash_padding = "?".repeat(usize::from(decimals));
                format!(
                    "_($* #,##0{fraction}_);_($* (#,##0{fraction});_($* \"-\"{dash_padding}_);_(@_)"
                )
            }
            FormatKind::Date => DATE_FORMAT.to_string(),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        <FormatKind as ValueEnum>::from_str(s.trim(), true)
    }
}

/// `.00` for two decimals, empty for none.
fn fraction_part(decimals: u8) -> String {
    if decimals == 0 {
        String::new()
    } else {
        format!(".{}", "0".repeat(usize::from(decimals)))
    }
}

/// What the user asked for: a named format or a literal format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSpec {
    Named { kind: FormatKind, decimals: u8 },
    Custom(String),
}

impl FormatSpec {
    /// Picks the format from command-line style inputs. A custom string wins
    /// over a named kind; having neither is an error.
    pub fn from_options(
        kind: Option<FormatKind>,
        custom: Option<&str>,
        decimals: u8,
    ) -> Result<Self> {
        if let Some(custom) = custom {
            if custom.trim().is_empty() {
                return Err(ToolError::MissingFormat);
            }
            return Ok(FormatSpec::Custom(custom.to_string()));
        }

        match kind {
            Some(kind) => Ok(FormatSpec::Named { kind, decimals }),
            None => Err(ToolError::MissingFormat),
        }
    }

    /// The concrete number-format string.
    pub fn resolve(&self) -> String {
        match self {
            FormatSpec::Named { kind, decimals } => kind.resolve(*decimals),
            FormatSpec::Custom(format) => format.clone(),
        }
    }

    /// Format name as reported back to the user (`custom` for literal strings).
    pub fn type_name(&self) -> &'static str {
        match self {
            FormatSpec::Named { kind, .. } => kind.name(),
            FormatSpec::Custom(_) => "custom",
        }
    }
}
