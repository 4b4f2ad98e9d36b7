use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use excel_tools::commands::{ApplyRangeFormulaOptions, apply_range_formula};
use excel_tools::output;

/// Apply a formula template to every cell of an Excel range
#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Formula templates:\n  \
        {row}   current row number\n  \
        {col}   current column letter\n  \
        {cell}  current cell reference (e.g. B5)\n\n\
        Examples:\n  \
        excel-apply-range-formula --file model.xlsx --sheet Forecast --range B2:B10 --formula \"=A{row}*(1+$C$1)\" --json\n  \
        excel-apply-range-formula --file model.xlsx --sheet Summary --range A10:Z10 --formula \"=SUM({col}2:{col}9)\" --json"
)]
struct Cli {
    /// Excel file path
    #[arg(long)]
    file: PathBuf,

    /// Sheet name
    #[arg(long)]
    sheet: String,

    /// Target range (e.g. B2:B10, A1:C5)
    #[arg(long)]
    range: String,

    /// Formula template with {row}, {col} or {cell} placeholders
    #[arg(long, allow_hyphen_values = true)]
    formula: String,

    /// Output JSON response
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = match output::parse_args::<Cli>() {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    output::init_logging();

    let outcome = apply_range_formula(&ApplyRangeFormulaOptions {
        file: cli.file,
        sheet: cli.sheet,
        range: cli.range,
        formula: cli.formula,
    });

    output::finish(outcome, cli.json)
}
