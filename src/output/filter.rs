//! Filtered views over inspection results

use crate::inspection::{InspectionResult, ResultClass};
use crate::url::top_level_directory;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Matches shown when a listing is printed without an explicit limit
pub const DEFAULT_DISPLAY_LIMIT: usize = 100;

/// Filter on result classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Indexed,
    NotIndexed,
    Error,
}

impl StatusFilter {
    fn matches(&self, result: &InspectionResult) -> bool {
        match self {
            Self::All => true,
            Self::Indexed => result.class() == ResultClass::Indexed,
            Self::NotIndexed => result.class() == ResultClass::NotIndexed,
            Self::Error => result.class() == ResultClass::Error,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "indexed" => Ok(Self::Indexed),
            "not-indexed" | "not_indexed" | "notindexed" => Ok(Self::NotIndexed),
            "error" | "errors" => Ok(Self::Error),
            other => Err(format!(
                "unknown status filter '{}' (expected all, indexed, not-indexed or error)",
                other
            )),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Indexed => write!(f, "indexed"),
            Self::NotIndexed => write!(f, "not-indexed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Filter on top-level directory
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DirectoryFilter {
    #[default]
    All,
    Only(String),
}

impl DirectoryFilter {
    /// Restricts to one directory; `blog`, `/blog` and `/blog/` are equivalent
    pub fn only(directory: &str) -> Self {
        let trimmed = directory.trim().trim_matches('/');
        if trimmed.is_empty() {
            Self::Only("/".to_string())
        } else {
            Self::Only(format!("/{}/", trimmed))
        }
    }

    fn matches(&self, result: &InspectionResult) -> bool {
        match self {
            Self::All => true,
            Self::Only(directory) => {
                top_level_directory(&result.url).as_deref() == Some(directory.as_str())
            }
        }
    }
}

/// Status, directory and free-text filters, combined with AND
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFilter {
    pub status: StatusFilter,
    pub directory: DirectoryFilter,

    /// Case-insensitive substring of the URL; empty matches everything
    pub search: String,
}

impl ResultFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_directory(mut self, directory: DirectoryFilter) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        self.status == StatusFilter::All
            && self.directory == DirectoryFilter::All
            && self.search.is_empty()
    }

    pub fn matches(&self, result: &InspectionResult) -> bool {
        self.status.matches(result)
            && self.directory.matches(result)
            && contains_ignore_case(&result.url, &self.search)
    }

    /// Returns matching results in their original order
    pub fn apply<'a>(&self, results: &'a [InspectionResult]) -> Vec<&'a InspectionResult> {
        results.iter().filter(|r| self.matches(r)).collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Distinct top-level directories present in the results, ascending
pub fn observed_directories(results: &[InspectionResult]) -> Vec<String> {
    results
        .iter()
        .filter_map(|r| top_level_directory(&r.url))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
