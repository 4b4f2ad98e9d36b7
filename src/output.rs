//! Printing command results as JSON or plain text.

use std::process::ExitCode;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Value, json};

use crate::commands::Report;
use crate::error::ToolError;

pub fn serialize_to_json<T: Serialize>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).context("Failed to serialize data to JSON")
}

/// JSON body reported for a failed command.
pub fn error_json(error: &ToolError) -> Value {
    let mut body = json!({
        "status": "error",
        "error": error.to_string(),
        "error_type": error.category(),
    });
    if let Some(suggestion) = error.suggestion() {
        body["suggested_name"] = Value::String(suggestion.to_string());
    }
    body
}

/// Prints a success report to stdout.
pub fn print_report<R: Report>(report: &R, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serialize_to_json(report)?);
    } else {
        for line in report.summary_lines() {
            println!("{line}");
        }
    }
    Ok(())
}

/// Prints an error (JSON to stdout, text to stderr).
pub fn print_error(error: &ToolError, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serialize_to_json(&error_json(error))?);
    } else {
        eprintln!("Error: {error}");
    }
    Ok(())
}

/// Reports a command outcome and turns it into the process exit code.
pub fn finish<R: Report>(outcome: crate::error::Result<R>, as_json: bool) -> ExitCode {
    let printed = match &outcome {
        Ok(report) => print_report(report, as_json),
        Err(error) => print_error(error, as_json),
    };

    if let Err(e) = printed {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match outcome {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

/// Parses command-line arguments, mapping usage errors to exit code 1.
/// `--help` and `--version` print and exit successfully.
pub fn parse_args<C: clap::Parser>() -> std::result::Result<C, ExitCode> {
    C::try_parse().map_err(|err| {
        let _ = err.print();
        if err.use_stderr() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    })
}

/// Installs stderr logging; `RUST_LOG` overrides the default `warn` level.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
}
