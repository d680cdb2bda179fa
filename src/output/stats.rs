//! Statistics over inspection results
//!
//! Every function here is pure: the same result slice always yields the same
//! statistics, regardless of how many times it is aggregated.

use crate::inspection::{InspectionResult, ResultClass};
use crate::url::{path_depth, top_level_directory};
use std::collections::BTreeMap;

/// Overall counts and rates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverallStats {
    pub total: usize,
    pub indexed: usize,
    pub not_indexed: usize,
    pub errors: usize,
    pub indexed_pct: f64,
    pub not_indexed_pct: f64,
    pub error_pct: f64,
}

/// Counts for one top-level directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryStats {
    /// `/segment/`, or `/` for the root
    pub directory: String,
    pub total: usize,
    pub indexed: usize,
}

/// Counts for one path depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthStats {
    pub depth: usize,
    pub total: usize,
    pub indexed: usize,
}

/// Occurrences of one exact error message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorStats {
    pub error: String,
    pub count: usize,
}

/// All breakdowns of a result set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectionSummary {
    pub overall: OverallStats,
    pub directories: Vec<DirectoryStats>,
    pub depths: Vec<DepthStats>,
    pub errors: Vec<ErrorStats>,
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

impl DirectoryStats {
    pub fn indexed_pct(&self) -> f64 {
        percentage(self.indexed, self.total)
    }
}

impl DepthStats {
    pub fn indexed_pct(&self) -> f64 {
        percentage(self.indexed, self.total)
    }
}

/// Counts indexed, not-indexed and errored results
pub fn overall_stats(results: &[InspectionResult]) -> OverallStats {
    let mut stats = OverallStats {
        total: results.len(),
        ..OverallStats::default()
    };

    for result in results {
        match result.class() {
            ResultClass::Indexed => stats.indexed += 1,
            ResultClass::NotIndexed => stats.not_indexed += 1,
            ResultClass::Error => stats.errors += 1,
        }
    }

    stats.indexed_pct = percentage(stats.indexed, stats.total);
    stats.not_indexed_pct = percentage(stats.not_indexed, stats.total);
    stats.error_pct = percentage(stats.errors, stats.total);
    stats
}

/// Groups results by top-level directory
///
/// Results whose URL cannot be parsed are left out. Sorted by total
/// descending, then directory ascending.
pub fn directory_stats(results: &[InspectionResult]) -> Vec<DirectoryStats> {
    let mut groups: BTreeMap<String, (usize, usize)> = BTreeMap::new();

    for result in results {
        let Some(directory) = top_level_directory(&result.url) else {
            continue;
        };
        let entry = groups.entry(directory).or_default();
        entry.0 += 1;
        if result.is_indexed() {
            entry.1 += 1;
        }
    }

    let mut stats: Vec<_> = groups
        .into_iter()
        .map(|(directory, (total, indexed))| DirectoryStats {
            directory,
            total,
            indexed,
        })
        .collect();

    // stable sort keeps the BTreeMap's ascending order among ties
    stats.sort_by(|a, b| b.total.cmp(&a.total));
    stats
}

/// Groups results by number of non-empty path segments, shallowest first
pub fn depth_stats(results: &[InspectionResult]) -> Vec<DepthStats> {
    let mut groups: BTreeMap<usize, (usize, usize)> = BTreeMap::new();

    for result in results {
        let Some(depth) = path_depth(&result.url) else {
            continue;
        };
        let entry = groups.entry(depth).or_default();
        entry.0 += 1;
        if result.is_indexed() {
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(depth, (total, indexed))| DepthStats {
            depth,
            total,
            indexed,
        })
        .collect()
}

/// Groups errored results by exact message, most frequent first
pub fn error_stats(results: &[InspectionResult]) -> Vec<ErrorStats> {
    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();

    for message in results.iter().filter_map(InspectionResult::error_message) {
        *groups.entry(message).or_default() += 1;
    }

    let mut stats: Vec<_> = groups
        .into_iter()
        .map(|(error, count)| ErrorStats {
            error: error.to_string(),
            count,
        })
        .collect();

    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

/// Computes every breakdown at once
pub fn aggregate(results: &[InspectionResult]) -> InspectionSummary {
    InspectionSummary {
        overall: overall_stats(results),
        directories: directory_stats(results),
        depths: depth_stats(results),
        errors: error_stats(results),
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The statistics to display
pub fn print_statistics(summary: &InspectionSummary) {
    let overall = &summary.overall;

    println!("=== Inspection Statistics ===\n");

    println!("Overview:");
    println!("  Total URLs: {}", overall.total);
    println!(
        "  Indexed: {} ({:.1}%)",
        overall.indexed, overall.indexed_pct
    );
    println!(
        "  Not indexed: {} ({:.1}%)",
        overall.not_indexed, overall.not_indexed_pct
    );
    println!("  Errors: {} ({:.1}%)", overall.errors, overall.error_pct);
    println!();

    if !summary.directories.is_empty() {
        println!("By Directory:");
        for dir in &summary.directories {
            println!(
                "  {}: {} URLs, {} indexed ({:.1}%)",
                dir.directory,
                dir.total,
                dir.indexed,
                dir.indexed_pct()
            );
        }
        println!();
    }

    if !summary.depths.is_empty() {
        println!("By Depth:");
        for depth in &summary.depths {
            println!(
                "  {}: {} URLs, {} indexed ({:.1}%)",
                depth.depth,
                depth.total,
                depth.indexed,
                depth.indexed_pct()
            );
        }
        println!();
    }

    if !summary.errors.is_empty() {
        println!("Errors:");
        for error in &summary.errors {
            println!("  {}: {}", error.error, error.count);
        }
        println!();
    }
}
