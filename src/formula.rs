//! Formula templates with per-cell placeholders.
//!
//! A template such as `=A{row}*1.15` is expanded once for every cell of a
//! range. Three placeholders are recognized:
//!
//! - `{row}`: the target cell's row number
//! - `{col}`: the target cell's column letters
//! - `{cell}`: the target cell's full reference
//!
//! Anything else, including unknown `{...}` tokens and stray braces, is
//! copied through as-is.

use crate::reference::{CellRef, RangeRef};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Row,
    Col,
    Cell,
}

/// A parsed formula template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl FormulaTemplate {
    pub fn new(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let tail = &rest[open..];

            let placeholder = [
                ("{row}", Segment::Row),
                ("{col}", Segment::Col),
                ("{cell}", Segment::Cell),
            ]
            .into_iter()
            .find(|(token, _)| tail.starts_with(token));

            match placeholder {
                Some((token, segment)) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                    rest = &tail[token.len()..];
                }
                None => {
                    literal.push('{');
                    rest = &tail[1..];
                }
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            source: template.to_string(),
            segments,
        }
    }

    /// The template text as given.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the template contains any placeholder at all.
    pub fn has_placeholders(&self) -> bool {
        self.segments
            .iter()
            .any(|segment| !matches!(segment, Segment::Literal(_)))
    }

    /// Substitutes the placeholders for one target cell.
    pub fn render(&self, cell: CellRef) -> String {
        let mut out = String::with_capacity(self.source.len() + 8);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Row => out.push_str(&cell.row().to_string()),
                Segment::Col => out.push_str(&cell.column_letters()),
                Segment::Cell => out.push_str(&cell.to_string()),
            }
        }
        out
    }

    /// Renders the template for every cell of `range` in row-major order.
    pub fn expand(&self, range: &RangeRef) -> Vec<(CellRef, String)> {
        range.cells().map(|cell| (cell, self.render(cell))).collect()
    }
}
