use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use excel_tools::commands::{FormatRangeOptions, format_range};
use excel_tools::number_format::{DEFAULT_DECIMALS, FormatKind, MAX_DECIMALS};
use excel_tools::output;

/// Apply number formatting to an Excel range
#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Examples:\n  \
        excel-format-range --file model.xlsx --sheet \"Income Statement\" --range C2:H20 --format currency --decimals 0 --json\n  \
        excel-format-range --file model.xlsx --sheet Analysis --range D2:D50 --format percent --decimals 1 --json\n  \
        excel-format-range --file model.xlsx --sheet Data --range A1:A100 --custom-format \"0.00%\" --json"
)]
struct Cli {
    /// Excel file path
    #[arg(long)]
    file: PathBuf,

    /// Sheet name
    #[arg(long)]
    sheet: String,

    /// Target range (e.g. C2:H20)
    #[arg(long)]
    range: String,

    /// Format type
    #[arg(long, value_enum, ignore_case = true)]
    format: Option<FormatKind>,

    /// Custom Excel format string (overrides --format)
    #[arg(long, allow_hyphen_values = true)]
    custom_format: Option<String>,

    /// Decimal places
    #[arg(
        long,
        default_value_t = DEFAULT_DECIMALS,
        value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_DECIMALS))
    )]
    decimals: u8,

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

    let outcome = format_range(&FormatRangeOptions {
        file: cli.file,
        sheet: cli.sheet,
        range: cli.range,
        format: cli.format,
        custom_format: cli.custom_format,
        decimals: cli.decimals,
    });

    output::finish(outcome, cli.json)
}
