//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of a job,
//! including coverage statistics and per-directory, per-depth and per-error
//! breakdowns.

use crate::output::report::JobReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Directories and errors listed before the remainder is collapsed
const TOP_ROWS: usize = 50;

/// Generates a markdown summary file for a job
///
/// # Arguments
///
/// * `report` - The job report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(report: &JobReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a job report as markdown
pub fn format_markdown_summary(report: &JobReport) -> String {
    let mut md = String::new();
    let overall = &report.summary.overall;

    md.push_str("# Sumi-Inspect Summary\n\n");

    // Run metadata
    md.push_str("## Job Information\n\n");
    md.push_str(&format!("- **Job ID**: {}\n", report.job_id));
    md.push_str(&format!("- **Property**: {}\n", report.site_url));
    md.push_str(&format!("- **Status**: {}\n", report.status));
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Last Update**: {}\n", report.updated_at.to_rfc3339()));
    let duration = report.duration_seconds();
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2} minutes)\n",
        duration,
        duration as f64 / 60.0
    ));
    md.push_str(&format!(
        "- **Progress**: {} / {} URLs ({:.1}%)\n",
        report.completed_urls,
        report.total_urls,
        report.completion_pct()
    ));
    if let Some(failure) = &report.failure {
        md.push_str(&format!("- **Failure**: {}\n", failure));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Result | Count | Share |\n");
    md.push_str("|--------|-------|-------|\n");
    md.push_str(&format!(
        "| Indexed | {} | {:.1}% |\n",
        overall.indexed, overall.indexed_pct
    ));
    md.push_str(&format!(
        "| Not Indexed | {} | {:.1}% |\n",
        overall.not_indexed, overall.not_indexed_pct
    ));
    md.push_str(&format!(
        "| Error | {} | {:.1}% |\n",
        overall.errors, overall.error_pct
    ));
    md.push_str(&format!("| **Total** | {} | |\n\n", overall.total));

    // Directory breakdown
    let directories = &report.summary.directories;
    if !directories.is_empty() {
        md.push_str("## By Directory\n\n");
        md.push_str("| Directory | URLs | Indexed | Indexed % |\n");
        md.push_str("|-----------|------|---------|-----------|\n");

        for dir in directories.iter().take(TOP_ROWS) {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% |\n",
                escape_cell(&dir.directory),
                dir.total,
                dir.indexed,
                dir.indexed_pct()
            ));
        }
        if directories.len() > TOP_ROWS {
            md.push_str(&format!(
                "\n... and {} more directories\n",
                directories.len() - TOP_ROWS
            ));
        }
        md.push('\n');
    }

    // Depth breakdown
    let depths = &report.summary.depths;
    if !depths.is_empty() {
        md.push_str("## By Depth\n\n");
        md.push_str("| Depth | URLs | Indexed | Indexed % |\n");
        md.push_str("|-------|------|---------|-----------|\n");

        for depth in depths {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% |\n",
                depth.depth,
                depth.total,
                depth.indexed,
                depth.indexed_pct()
            ));
        }
        md.push('\n');
    }

    // Error summary
    let errors = &report.summary.errors;
    if !errors.is_empty() {
        md.push_str("## Errors\n\n");
        md.push_str("| Error | Count |\n");
        md.push_str("|-------|-------|\n");

        for error in errors.iter().take(TOP_ROWS) {
            md.push_str(&format!(
                "| {} | {} |\n",
                escape_cell(&error.error),
                error.count
            ));
        }
        if errors.len() > TOP_ROWS {
            md.push_str(&format!(
                "\n... and {} more distinct errors\n",
                errors.len() - TOP_ROWS
            ));
        }
        md.push('\n');
    }

    md
}

/// Escapes pipes and flattens line breaks so a value stays in one table cell
fn escape_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::{IndexStatus, InspectionResult, INDEXED_COVERAGE_STATE};
    use crate::output::stats::aggregate;
    use crate::state::JobStatus;
    use chrono::{Duration, Utc};

    fn create_test_report() -> JobReport {
        let results = vec![
            InspectionResult::success(
                "https://x.com/a/1",
                IndexStatus::with_coverage(INDEXED_COVERAGE_STATE),
            ),
            InspectionResult::success(
                "https://x.com/a/2",
                IndexStatus::with_coverage("Crawled - currently not indexed"),
            ),
            InspectionResult::error("https://x.com/b/1", "HTTP 429 | quota"),
        ];
        let started_at = Utc::now() - Duration::seconds(3600);

        JobReport {
            job_id: "job-1".to_string(),
            site_url: "https://x.com/".to_string(),
            status: JobStatus::Completed,
            started_at,
            updated_at: started_at + Duration::seconds(3600),
            total_urls: 3,
            completed_urls: 3,
            failure: None,
            summary: aggregate(&results),
        }
    }

    #[test]
    fn test_format_markdown_summary() {
        let markdown = format_markdown_summary(&create_test_report());

        assert!(markdown.contains("# Sumi-Inspect Summary"));
        assert!(markdown.contains("- **Job ID**: job-1"));
        assert!(markdown.contains("- **Status**: completed"));
        assert!(markdown.contains("3600 seconds"));
        assert!(markdown.contains("| Indexed | 1 | 33.3% |"));
    }

    #[test]
    fn test_markdown_breakdowns() {
        let markdown = format_markdown_summary(&create_test_report());

        assert!(markdown.contains("| /a/ | 2 | 1 | 50.0% |"));
        assert!(markdown.contains("| /b/ | 1 | 0 | 0.0% |"));
        assert!(markdown.contains("| 2 | 3 | 1 | 33.3% |"));
        assert!(markdown.contains("| HTTP 429 \\| quota | 1 |"));
    }

    #[test]
    fn test_table_cells_are_escaped() {
        let results = vec![
            InspectionResult::success(
                "https://x.com/a|b/1",
                IndexStatus::with_coverage(INDEXED_COVERAGE_STATE),
            ),
            InspectionResult::error("https://x.com/c/1", "bad | worse\nworst"),
        ];
        let mut report = create_test_report();
        report.summary = aggregate(&results);

        let markdown = format_markdown_summary(&report);
        assert!(markdown.contains("| /a\\|b/ | 1 | 1 | 100.0% |"));
        assert!(markdown.contains("| bad \\| worse worst | 1 |"));
    }

    #[test]
    fn test_markdown_failure_line() {
        let mut report = create_test_report();
        report.status = JobStatus::Failed;
        report.failure = Some("inspection task panicked".to_string());

        let markdown = format_markdown_summary(&report);
        assert!(markdown.contains("- **Failure**: inspection task panicked"));
    }

    #[test]
    fn test_generate_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");

        generate_markdown_summary(&create_test_report(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Sumi-Inspect Summary"));
    }
}
