//! Worksheet name rules.
//!
//! Excel rejects names that are empty, longer than 31 characters, contain
//! any of `[ ] : * ? / \`, start or end with an apostrophe, or equal the
//! reserved name `History`.

use crate::error::{Result, ToolError};

pub const MAX_SHEET_NAME_LEN: usize = 31;

pub const FORBIDDEN_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

const RESERVED_NAME: &str = "History";

const FALLBACK_NAME: &str = "Sheet";

/// The first rule a name breaks, if any.
pub fn sheet_name_problem(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("name is empty".to_string());
    }

    let len = name.chars().count();
    if len > MAX_SHEET_NAME_LEN {
        return Some(format!(
            "name is {len} characters long, the limit is {MAX_SHEET_NAME_LEN}"
        ));
    }

    if let Some(c) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Some(format!("contains forbidden character '{c}'"));
    }

    if name.starts_with('\'') || name.ends_with('\'') {
        return Some("name cannot begin or end with an apostrophe".to_string());
    }

    if name.eq_ignore_ascii_case(RESERVED_NAME) {
        return Some(format!("'{RESERVED_NAME}' is reserved"));
    }

    None
}

pub fn is_valid_sheet_name(name: &str) -> bool {
    sheet_name_problem(name).is_none()
}

/// Turns any string into a name that passes [`is_valid_sheet_name`].
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let mut sanitized: String = replaced
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_LEN)
        .collect();

    // Truncation can expose a trailing apostrophe again.
    while sanitized.ends_with('\'') {
        sanitized.pop();
    }

    if sanitized.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    if sanitized.eq_ignore_ascii_case(RESERVED_NAME) {
        sanitized.push('_');
    }

    sanitized
}

/// Fails with the broken rule and a sanitized suggestion.
pub fn validate_sheet_name(name: &str) -> Result<()> {
    match sheet_name_problem(name) {
        None => Ok(()),
        Some(reason) => Err(ToolError::InvalidSheetName {
            name: name.to_string(),
            reason,
            suggestion: sanitize_sheet_name(name),
        }),
    }
}
