//! Output module for inspection statistics and reports
//!
//! This module handles:
//! - Aggregating results into overall, directory, depth and error statistics
//! - Filtering results for display
//! - Writing markdown summaries and CSV exports

mod csv;
pub mod filter;
mod markdown;
mod report;
pub mod stats;

pub use self::csv::{export_csv, write_csv, CSV_HEADER};
pub use filter::{
    observed_directories, DirectoryFilter, ResultFilter, StatusFilter, DEFAULT_DISPLAY_LIMIT,
};
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::JobReport;
pub use stats::{
    aggregate, depth_stats, directory_stats, error_stats, overall_stats, print_statistics,
    DepthStats, DirectoryStats, ErrorStats, InspectionSummary, OverallStats,
};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
