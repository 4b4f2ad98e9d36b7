mod common;

use calamine::Data;
use excel_tools::ToolError;
use excel_tools::commands::{FormatRangeOptions, format_range};
use excel_tools::number_format::FormatKind;
use pretty_assertions::assert_eq;

use common::{
    assert_layout_kept, formatted_cell_count, layout_workbook, number_format_at, sample_workbook,
    value_at,
};

fn options(file: &std::path::Path, range: &str, format: FormatKind) -> FormatRangeOptions {
    FormatRangeOptions {
        file: file.to_path_buf(),
        sheet: "Forecast".to_string(),
        range: range.to_string(),
        format: Some(format),
        custom_format: None,
        decimals: 2,
    }
}

#[test]
fn formats_every_cell_of_the_range() {
    let dir = tempfile::tempdir().unwrap();
    let file = sample_workbook(dir.path());

    let report = format_range(&FormatRangeOptions {
        decimals: 0,
        ..options(&file, "C2:H20", FormatKind::Currency)
    })
    .unwrap();

    assert_eq!(report.cells_formatted, 114);
    assert_eq!(report.format_type, "currency");
    assert_eq!(report.format_string, "$#,##0_);[Red]($#,##0)");
    assert_eq!(formatted_cell_count(&file, "Forecast"), 114);
    assert_eq!(
        number_format_at(&file, "Forecast", "H20").as_deref(),
        Some("$#,##0_);[Red]($#,##0)")
    );
    assert_eq!(number_format_at(&file, "Forecast", "B2"), None);
}

#[test]
fn keeps_cell_values() {
    let dir = tempfile::tempdir().unwrap();
    let file = sample_workbook(dir.path());

    format_range(&options(&file, "A2:A4", FormatKind::Number)).unwrap();

    assert_eq!(value_at(&file, "Forecast", "A3"), Some(Data::Float(200.0)));
    assert_eq!(
        number_format_at(&file, "Forecast", "A3").as_deref(),
        Some("#,##0.00")
    );
}

#[test]
fn custom_format_wins_over_the_named_one() {
    let dir = tempfile::tempdir().unwrap();
    let file = sample_workbook(dir.path());

    let report = format_range(&FormatRangeOptions {
        custom_format: Some("0.000\" kg\"".to_string()),
        ..options(&file, "A2:A4", FormatKind::Percent)
    })
    .unwrap();

    assert_eq!(report.format_type, "custom");
    assert_eq!(
        number_format_at(&file, "Forecast", "A4").as_deref(),
        Some("0.000\" kg\"")
    );
}

#[test]
fn reformatting_replaces_the_previous_format() {
    let dir = tempfile::tempdir().unwrap();
    let file = sample_workbook(dir.path());

    format_range(&options(&file, "A2:A4", FormatKind::Number)).unwrap();
    format_range(&FormatRangeOptions {
        decimals: 1,
        ..options(&file, "A3", FormatKind::Percent)
    })
    .unwrap();

    assert_eq!(
        number_format_at(&file, "Forecast", "A2").as_deref(),
        Some("#,##0.00")
    );
    assert_eq!(
        number_format_at(&file, "Forecast", "A3").as_deref(),
        Some("0.0%")
    );
}

#[test]
fn missing_format_fails_and_leaves_the_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let file = sample_workbook(dir.path());
    let before = std::fs::read(&file).unwrap();

    let err = format_range(&FormatRangeOptions {
        format: None,
        ..options(&file, "A2:A4", FormatKind::Number)
    })
    .unwrap_err();

    assert!(matches!(err, ToolError::MissingFormat));
    assert_eq!(err.category(), "missing-format-specification");
    assert_eq!(std::fs::read(&file).unwrap(), before);
}

#[test]
fn invalid_range_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let file = sample_workbook(dir.path());

    let err = format_range(&options(&file, "2C:H20", FormatKind::Date)).unwrap_err();
    assert!(matches!(err, ToolError::InvalidRange(_)));
}

#[test]
fn keeps_names_hidden_sheets_merges_and_widths() {
    let dir = tempfile::tempdir().unwrap();
    let file = layout_workbook(dir.path());

    format_range(&FormatRangeOptions {
        sheet: "Inputs".to_string(),
        ..options(&file, "A1", FormatKind::Percent)
    })
    .unwrap();

    assert_eq!(
        number_format_at(&file, "Inputs", "A1").as_deref(),
        Some("0.00%")
    );
    assert_layout_kept(&file);
}

#[test]
fn oversized_range_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = sample_workbook(dir.path());

    let err = format_range(&options(&file, "A1:XFD1048576", FormatKind::Number)).unwrap_err();
    assert!(matches!(err, ToolError::RangeTooLarge { .. }));
}
