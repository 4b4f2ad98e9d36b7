use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use excel_tools::commands::{AddSheetOptions, add_sheet};
use excel_tools::output;

/// Add a new worksheet to an Excel workbook
#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Examples:\n  \
        excel-add-sheet --file model.xlsx --sheet \"Scenario Analysis\" --json\n  \
        excel-add-sheet --file model.xlsx --sheet \"Executive Summary\" --index 0 --json\n  \
        excel-add-sheet --file model.xlsx --sheet \"Q2 Forecast\" --copy-from \"Q1 Forecast\" --json"
)]
struct Cli {
    /// Excel file path
    #[arg(long)]
    file: PathBuf,

    /// New sheet name
    #[arg(long)]
    sheet: String,

    /// Position to insert (0-based, default: end)
    #[arg(long)]
    index: Option<usize>,

    /// Copy content from an existing sheet
    #[arg(long)]
    copy_from: Option<String>,

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

    let outcome = add_sheet(&AddSheetOptions {
        file: cli.file,
        sheet: cli.sheet,
        index: cli.index,
        copy_from: cli.copy_from,
    });

    output::finish(outcome, cli.json)
}
