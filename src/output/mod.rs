//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan reports.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{print_error, print_info, print_warning, write_plain};

use crate::error::CliResult;
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One `Port <N>: <status>` line per port
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

/// Render `report` to `out` in the requested format.
pub fn write_report<W: Write>(out: &mut W, report: &ScanReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Plain => write_plain(out, report)?,
        OutputFormat::Json => write_json(out, report)?,
        OutputFormat::Csv => write_csv(out, report)?,
    }
    Ok(())
}

/// Render `report` to stdout.
pub fn print_report(report: &ScanReport, format: OutputFormat) -> CliResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report, format)?;
    out.flush()?;
    Ok(())
}
