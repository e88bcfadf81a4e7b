//! CSV output formatting.

use crate::scanner::ScanReport;
use std::io::Write;

/// Write the report as CSV, one row per port.
pub fn write_csv<W: Write>(out: &mut W, report: &ScanReport) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["port", "status", "error"])?;

    for result in &report.results {
        wtr.write_record([
            result.port.to_string().as_str(),
            result.status.to_string().as_str(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
