#![allow(dead_code)]

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, SheetVisible, Xlsx, open_workbook_auto};
use excel_tools::excel::{DefinedName, read_number_formats, read_package_layout};
use excel_tools::reference::CellRef;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Format, Workbook};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// `model.xlsx` with two sheets:
///
/// - `Inputs`: A1:A5 = 10..50, B1 = "Revenue", C1 = `=SUM(A1:A5)`, D1 formatted `0.00`
/// - `Forecast`: A2:A4 = 100, 200, 300
pub fn sample_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("model.xlsx");
    let mut workbook = Workbook::new();
    let two_places = Format::new().set_num_format("0.00");

    let inputs = workbook.add_worksheet().set_name("Inputs").unwrap();
    for row in 0..5u32 {
        inputs.write_number(row, 0, f64::from(row + 1) * 10.0).unwrap();
    }
    inputs.write_string(0, 1, "Revenue").unwrap();
    inputs.write_formula(0, 2, "=SUM(A1:A5)").unwrap();
    inputs.write_number_with_format(0, 3, 1.5, &two_places).unwrap();

    let forecast = workbook.add_worksheet().set_name("Forecast").unwrap();
    for (i, value) in [100.0, 200.0, 300.0].into_iter().enumerate() {
        forecast.write_number(i as u32 + 1, 0, value).unwrap();
    }

    workbook.save(&path).unwrap();
    path
}

pub fn sheet_names(path: &Path) -> Vec<String> {
    open_workbook_auto(path).unwrap().sheet_names().to_vec()
}

fn position(cell: &str) -> (u32, u32) {
    let (row, col) = CellRef::parse(cell).unwrap().zero_based();
    (row, u32::from(col))
}

pub fn value_at(path: &Path, sheet: &str, cell: &str) -> Option<Data> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let range = workbook.worksheet_range(sheet).unwrap();
    range.get_value(position(cell)).cloned()
}

/// Formula text with a leading `=`, if the cell holds one.
pub fn formula_at(path: &Path, sheet: &str, cell: &str) -> Option<String> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let range = workbook.worksheet_formula(sheet).unwrap();
    range
        .get_value(position(cell))
        .filter(|f| !f.is_empty())
        .map(|f| format!("={}", f.trim_start_matches('=')))
}

pub fn number_format_at(path: &Path, sheet: &str, cell: &str) -> Option<String> {
    let formats = read_number_formats(path).unwrap();
    let (row, col) = CellRef::parse(cell).unwrap().zero_based();
    formats.get(sheet)?.get(&(row, col)).cloned()
}

pub fn formatted_cell_count(path: &Path, sheet: &str) -> usize {
    read_number_formats(path)
        .unwrap()
        .get(sheet)
        .map_or(0, |formats| formats.len())
}

/// `layout.xlsx` with state no command touches:
///
/// - `Inputs`: A1 = 0.05 named `GrowthRate`, A3:D3 merged, column A 30
///   characters wide, A5 = `=A1*GrowthRate`
/// - `Secret`: hidden
/// - `Forecast`: A2:A4 = 100, 200, 300 and a local name `Horizon` for A4
pub fn layout_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("layout.xlsx");
    let mut workbook = Workbook::new();

    let inputs = workbook.add_worksheet().set_name("Inputs").unwrap();
    inputs.write_number(0, 0, 0.05).unwrap();
    inputs
        .merge_range(2, 0, 2, 3, "Assumptions", &Format::new().set_bold())
        .unwrap();
    inputs.set_column_width(0, 30).unwrap();
    inputs.write_formula(4, 0, "=A1*GrowthRate").unwrap();

    let secret = workbook.add_worksheet().set_name("Secret").unwrap();
    secret.write_string(0, 0, "internal").unwrap();
    secret.set_hidden(true);

    let forecast = workbook.add_worksheet().set_name("Forecast").unwrap();
    for (i, value) in [100.0, 200.0, 300.0].into_iter().enumerate() {
        forecast.write_number(i as u32 + 1, 0, value).unwrap();
    }

    workbook.define_name("GrowthRate", "=Inputs!$A$1").unwrap();
    workbook.define_name("Forecast!Horizon", "=Forecast!$A$4").unwrap();

    workbook.save(&path).unwrap();
    path
}

/// Asserts that everything [`layout_workbook`] set up is still in the file.
pub fn assert_layout_kept(path: &Path) {
    let mut workbook: Xlsx<BufReader<File>> = calamine::open_workbook(path).unwrap();

    let hidden: Vec<String> = workbook
        .sheets_metadata()
        .iter()
        .filter(|sheet| sheet.visible != SheetVisible::Visible)
        .map(|sheet| sheet.name.clone())
        .collect();
    assert_eq!(hidden, ["Secret"]);

    let merges = workbook.worksheet_merge_cells("Inputs").unwrap().unwrap();
    let merges: Vec<_> = merges.iter().map(|m| (m.start, m.end)).collect();
    assert_eq!(merges, [((2, 0), (2, 3))]);

    assert_eq!(
        formula_at(path, "Inputs", "A5").as_deref(),
        Some("=A1*GrowthRate")
    );

    let layout = read_package_layout(path).unwrap();
    let mut names = layout.defined_names.clone();
    names.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(
        names,
        [
            DefinedName::global("GrowthRate", "Inputs!$A$1"),
            DefinedName {
                name: "Horizon".to_string(),
                scope: Some("Forecast".to_string()),
                formula: "Forecast!$A$4".to_string(),
            },
        ]
    );

    let column_a = layout.sheets["Inputs"]
        .columns
        .iter()
        .find(|(col, _)| *col == 0)
        .map(|(_, column)| column.width);
    assert_eq!(column_a, Some(Some(30.7109375)));
}

/// Rewrites one part of an xlsx package in place.
pub fn edit_package_part(path: &Path, part: &str, edit: impl Fn(String) -> String) {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        entries.push((file.name().to_string(), content));
    }
    drop(archive);

    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        let content = if name == part {
            edit(String::from_utf8(content).unwrap()).into_bytes()
        } else {
            content
        };
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(&content).unwrap();
    }
    writer.finish().unwrap();
}
