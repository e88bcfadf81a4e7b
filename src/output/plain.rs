//! Plain text output formatting.

use crate::scanner::ScanReport;
use console::style;
use std::io::{self, Write};

/// Write one `Port <N>: <status>` line per result, in report order.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    for result in &report.results {
        writeln!(out, "Port {}: {}", result.port, result.status)?;
    }
    Ok(())
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print an info message to stderr, keeping stdout for results.
pub fn print_info(msg: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), msg);
}
