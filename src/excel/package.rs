//! Reads the parts of an xlsx package that calamine leaves out.
//!
//! calamine reads values, formulas, merges and sheet visibility. Number
//! formats, column widths and the scope of defined names are read here
//! straight from the package XML:
//!
//! - `styles.xml` maps a style index to a format code, and each worksheet
//!   tags its cells with a style index
//! - each worksheet lists its column widths in `<cols>`
//! - `workbook.xml` holds the defined names with their `localSheetId`

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use zip::ZipArchive;

use crate::error::Result;
use crate::excel::{ColumnLayout, DefinedName};
use crate::reference::{CellRef, MAX_COLUMN};

/// Number format codes of one sheet, keyed by 0-based `(row, col)`.
pub type SheetNumberFormats = HashMap<(u32, u16), String>;

/// Styling read from one worksheet part.
#[derive(Debug, Default)]
pub struct SheetLayout {
    pub number_formats: SheetNumberFormats,
    /// Columns with a width or hidden flag, keyed by 0-based index
    pub columns: Vec<(u16, ColumnLayout)>,
}

/// Everything read from the package XML.
#[derive(Debug, Default)]
pub struct PackageLayout {
    pub sheets: HashMap<String, SheetLayout>,
    pub defined_names: Vec<DefinedName>,
}

/// Format codes Excel knows by id without listing them in `styles.xml`.
fn builtin_number_format(id: u32) -> Option<&'static str> {
    let code = match id {
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        5 => "$#,##0_);($#,##0)",
        6 => "$#,##0_);[Red]($#,##0)",
        7 => "$#,##0.00_);($#,##0.00)",
        8 => "$#,##0.00_);[Red]($#,##0.00)",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0_);(#,##0)",
        38 => "#,##0_);[Red](#,##0)",
        39 => "#,##0.00_);(#,##0.00)",
        40 => "#,##0.00_);[Red](#,##0.00)",
        41 => r#"_(* #,##0_);_(* \(#,##0\);_(* "-"_);_(@_)"#,
        42 => r#"_("$"* #,##0_);_("$"* \(#,##0\);_("$"* "-"_);_(@_)"#,
        43 => r#"_(* #,##0.00_);_(* \(#,##0.00\);_(* "-"??_);_(@_)"#,
        44 => r#"_("$"* #,##0.00_);_("$"* \(#,##0.00\);_("$"* "-"??_);_(@_)"#,
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mm:ss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}

/// Value of the attribute named `name` (matched on its local part).
fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes().flatten() {
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Calls `on_element` for every start or empty element of a package part.
/// A missing part is treated as empty.
fn for_each_element<R, F>(archive: &mut ZipArchive<R>, part: &str, mut on_element: F) -> Result<()>
where
    R: Read + Seek,
    F: FnMut(&BytesStart<'_>) -> Result<()>,
{
    let file = match archive.by_name(part) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => {
            debug!("package part {part} not present");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) => on_element(e)?,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

/// Format code for every entry of `cellXfs`, `None` for General.
fn read_cell_formats<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<Option<String>>> {
    let mut custom: HashMap<u32, String> = HashMap::new();
    let mut xf_ids: Vec<u32> = Vec::new();
    let mut section = Vec::new();

    for_each_element(archive, "xl/styles.xml", |e| {
        match e.local_name().as_ref() {
            b"numFmt" => {
                let id = attribute(e, b"numFmtId")?.and_then(|id| id.parse().ok());
                let code = attribute(e, b"formatCode")?;
                if let (Some(id), Some(code)) = (id, code) {
                    custom.insert(id, code);
                }
            }
            name @ (b"cellXfs" | b"cellStyleXfs" | b"dxfs") => {
                section.clear();
                section.extend_from_slice(name);
            }
            b"xf" if section == b"cellXfs" => {
                let id = attribute(e, b"numFmtId")?
                    .and_then(|id| id.parse().ok())
                    .unwrap_or(0);
                xf_ids.push(id);
            }
            _ => {}
        }
        Ok(())
    })?;

    Ok(xf_ids
        .into_iter()
        .map(|id| match custom.get(&id) {
            Some(code) => Some(code.clone()),
            None => builtin_number_format(id).map(str::to_string),
        })
        .collect())
}

/// `(sheet name, part path)` for every `<sheet>` of `workbook.xml`, in
/// order. The path is `None` when the relationship is missing.
fn read_sheet_parts<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<(String, Option<String>)>> {
    let mut targets: HashMap<String, String> = HashMap::new();
    for_each_element(archive, "xl/_rels/workbook.xml.rels", |e| {
        if e.local_name().as_ref() == b"Relationship" {
            if let (Some(id), Some(target)) = (attribute(e, b"Id")?, attribute(e, b"Target")?) {
                let path = match target.strip_prefix('/') {
                    Some(absolute) => absolute.to_string(),
                    None => format!("xl/{target}"),
                };
                targets.insert(id, path);
            }
        }
        Ok(())
    })?;

    let mut sheets = Vec::new();
    for_each_element(archive, "xl/workbook.xml", |e| {
        if e.local_name().as_ref() == b"sheet" {
            if let Some(name) = attribute(e, b"name")? {
                let path = attribute(e, b"id")?.and_then(|id| targets.get(&id).cloned());
                sheets.push((name, path));
            }
        }
        Ok(())
    })?;

    Ok(sheets)
}

fn is_true(value: Option<String>) -> bool {
    matches!(value.as_deref(), Some("1" | "true"))
}

/// A `<col min max width hidden>` element, expanded to one entry per column.
fn read_column_span(e: &BytesStart<'_>, columns: &mut Vec<(u16, ColumnLayout)>) -> Result<()> {
    let min: Option<u32> = attribute(e, b"min")?.and_then(|v| v.parse().ok());
    let max: Option<u32> = attribute(e, b"max")?.and_then(|v| v.parse().ok());
    let width: Option<f64> = attribute(e, b"width")?.and_then(|v| v.parse().ok());
    let hidden = is_true(attribute(e, b"hidden")?);

    let (Some(min), Some(max)) = (min, max) else {
        return Ok(());
    };
    let layout = ColumnLayout {
        width: width.filter(|w| *w > 0.0),
        hidden,
    };
    if layout == ColumnLayout::default() {
        return Ok(());
    }

    for col in min.max(1)..=max.min(MAX_COLUMN) {
        columns.push(((col - 1) as u16, layout));
    }
    Ok(())
}

fn read_sheet_layout<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    part: &str,
    cell_formats: &[Option<String>],
) -> Result<SheetLayout> {
    let mut layout = SheetLayout::default();

    for_each_element(archive, part, |e| {
        match e.local_name().as_ref() {
            b"col" => read_column_span(e, &mut layout.columns)?,
            b"c" => {
                let Some(style) = attribute(e, b"s")?.and_then(|s| s.parse::<usize>().ok()) else {
                    return Ok(());
                };
                let Some(Some(code)) = cell_formats.get(style) else {
                    return Ok(());
                };
                match attribute(e, b"r")?.and_then(|r| CellRef::parse(&r).ok()) {
                    Some(cell) => {
                        layout.number_formats.insert(cell.zero_based(), code.clone());
                    }
                    None => debug!("styled cell without a usable reference in {part}"),
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    Ok(layout)
}

/// Defined names of `workbook.xml`, with local names resolved to their sheet.
fn read_defined_names<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    sheet_names: &[String],
) -> Result<Vec<DefinedName>> {
    let file = match archive.by_name("xl/workbook.xml") {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut xml = Reader::from_reader(BufReader::new(file));
    let mut buf = Vec::new();
    let mut names = Vec::new();
    let mut current: Option<(String, Option<String>, String)> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.local_name().as_ref() == b"definedName" => {
                let name = attribute(e, b"name")?.unwrap_or_default();
                let scope = attribute(e, b"localSheetId")?
                    .and_then(|id| id.parse::<usize>().ok())
                    .and_then(|id| sheet_names.get(id).cloned());
                current = Some((name, scope, String::new()));
            }
            Event::Text(ref t) => {
                if let Some((_, _, formula)) = current.as_mut() {
                    formula.push_str(&t.unescape()?);
                }
            }
            Event::End(ref e) if e.local_name().as_ref() == b"definedName" => {
                if let Some((name, scope, formula)) = current.take() {
                    if name.is_empty() || formula.trim().is_empty() {
                        debug!("skipping empty defined name '{name}'");
                    } else {
                        names.push(DefinedName {
                            name,
                            scope,
                            formula: formula.trim().to_string(),
                        });
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(names)
}

/// Number formats, column layout and defined names of an xlsx file.
pub fn read_package_layout(path: &Path) -> Result<PackageLayout> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let cell_formats = read_cell_formats(&mut archive)?;
    let sheet_parts = read_sheet_parts(&mut archive)?;

    let mut sheets = HashMap::new();
    for (name, part) in &sheet_parts {
        let Some(part) = part else {
            debug!("sheet '{name}' has no package part");
            continue;
        };
        let layout = read_sheet_layout(&mut archive, part, &cell_formats)?;
        debug!(
            "sheet '{name}': {} formatted cells, {} sized columns",
            layout.number_formats.len(),
            layout.columns.len()
        );
        sheets.insert(name.clone(), layout);
    }

    let sheet_names: Vec<String> = sheet_parts.into_iter().map(|(name, _)| name).collect();
    let defined_names = read_defined_names(&mut archive, &sheet_names)?;

    Ok(PackageLayout {
        sheets,
        defined_names,
    })
}

/// Number formats of every styled cell, keyed by sheet name.
pub fn read_number_formats(path: &Path) -> Result<HashMap<String, SheetNumberFormats>> {
    Ok(read_package_layout(path)?
        .sheets
        .into_iter()
        .map(|(name, layout)| (name, layout.number_formats))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_cover_common_formats() {
        assert_eq!(builtin_number_format(0), None);
        assert_eq!(builtin_number_format(4), Some("#,##0.00"));
        assert_eq!(builtin_number_format(10), Some("0.00%"));
        assert_eq!(builtin_number_format(49), Some("@"));
        assert_eq!(builtin_number_format(163), None);
    }

    #[test]
    fn column_spans_expand_to_each_column() {
        let e = BytesStart::from_content(r#"col min="2" max="4" width="12.7109375" customWidth="1""#, 3);
        let mut columns = Vec::new();
        read_column_span(&e, &mut columns).unwrap();

        let indexes: Vec<u16> = columns.iter().map(|(col, _)| *col).collect();
        assert_eq!(indexes, [1, 2, 3]);
        assert_eq!(columns[0].1.width, Some(12.7109375));
        assert!(!columns[0].1.hidden);

        let hidden = BytesStart::from_content(r#"col min="6" max="6" width="0" hidden="1""#, 3);
        read_column_span(&hidden, &mut columns).unwrap();
        assert_eq!(
            columns.last(),
            Some(&(5, ColumnLayout { width: None, hidden: true }))
        );
    }

    #[test]
    fn style_only_columns_are_skipped() {
        let e = BytesStart::from_content(r#"col min="1" max="16384" style="3""#, 3);
        let mut columns = Vec::new();
        read_column_span(&e, &mut columns).unwrap();
        assert!(columns.is_empty());
    }

    #[test]
    fn defined_names_resolve_their_sheet_scope() {
        use std::io::{Cursor, Write};
        use zip::write::SimpleFileOptions;

        let workbook_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheets><sheet name="Data" sheetId="1"/><sheet name="Q1 Plan" sheetId="2"/></sheets>
  <definedNames>
    <definedName name="GrowthRate">Data!$B$1</definedName>
    <definedName name="Total" localSheetId="1">'Q1 Plan'!$C$10</definedName>
    <definedName name="Label">"a &amp; b"</definedName>
  </definedNames>
</workbook>"#;

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("xl/workbook.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(workbook_xml.as_bytes()).unwrap();
        let mut archive = ZipArchive::new(writer.finish().unwrap()).unwrap();

        let sheets = ["Data".to_string(), "Q1 Plan".to_string()];
        let names = read_defined_names(&mut archive, &sheets).unwrap();
        assert_eq!(
            names,
            [
                DefinedName::global("GrowthRate", "Data!$B$1"),
                DefinedName {
                    name: "Total".to_string(),
                    scope: Some("Q1 Plan".to_string()),
                    formula: "'Q1 Plan'!$C$10".to_string(),
                },
                DefinedName::global("Label", "\"a & b\""),
            ]
        );
    }
}
