//! CSV export of inspection results
//!
//! One row per result in job order, columns `URL,Status,Last Crawl,Error`.
//! Fields are quoted per RFC 4180 when they contain a comma, quote or line
//! break; rows end with CRLF.

use crate::inspection::InspectionResult;
use crate::output::OutputResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV_HEADER: [&str; 4] = ["URL", "Status", "Last Crawl", "Error"];

/// Writes results as CSV to any writer
pub fn write_csv<W: Write>(results: &[InspectionResult], mut writer: W) -> OutputResult<()> {
    write_row(&mut writer, &CSV_HEADER)?;

    for result in results {
        let last_crawl = result
            .index_status()
            .and_then(|s| s.last_crawl_time.as_deref())
            .unwrap_or("");
        let error = result.error_message().unwrap_or("");

        write_row(
            &mut writer,
            &[&result.url, result.status_label(), last_crawl, error],
        )?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes results as a CSV file
///
/// # Arguments
///
/// * `results` - Results in job order
/// * `output_path` - Path where the CSV file should be written
pub fn export_csv(results: &[InspectionResult], output_path: &Path) -> OutputResult<()> {
    let file = File::create(output_path)?;
    write_csv(results, BufWriter::new(file))
}

fn write_row<W: Write>(writer: &mut W, fields: &[&str]) -> std::io::Result<()> {
    let line = fields
        .iter()
        .map(|field| escape_field(field))
        .collect::<Vec<_>>()
        .join(",");
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\r\n")
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
