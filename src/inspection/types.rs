//! Normalized inspection result types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coverage state the API reports for an indexed URL
pub const INDEXED_COVERAGE_STATE: &str = "Submitted and indexed";

/// Index status block returned by the inspection API
///
/// Every field is optional; the API omits fields it has no data for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub robots_txt_state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexing_state: Option<String>,

    /// RFC 3339 timestamp of the last crawl
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_crawl_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_fetch_state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_canonical: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_canonical: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawled_as: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sitemap: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referring_urls: Vec<String>,
}

impl IndexStatus {
    /// Creates an index status carrying only a coverage state
    pub fn with_coverage(state: impl Into<String>) -> Self {
        Self {
            coverage_state: Some(state.into()),
            ..Self::default()
        }
    }

    /// Returns true if the coverage state is the indexed one
    pub fn is_indexed(&self) -> bool {
        self.coverage_state.as_deref() == Some(INDEXED_COVERAGE_STATE)
    }
}

/// Outcome of a single inspection attempt
///
/// Serialized with the variant as the key, so a result flattens to either
/// `{"url": .., "indexStatus": {..}}` or `{"url": .., "error": ".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InspectionOutcome {
    #[serde(rename = "indexStatus")]
    Success(IndexStatus),

    #[serde(rename = "error")]
    Error(String),
}

/// One inspected URL and its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionResult {
    pub url: String,

    #[serde(flatten)]
    pub outcome: InspectionOutcome,
}

/// Coarse classification used by statistics, filters and exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultClass {
    Indexed,
    NotIndexed,
    Error,
}

impl fmt::Display for ResultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indexed => write!(f, "Indexed"),
            Self::NotIndexed => write!(f, "Not Indexed"),
            Self::Error => write!(f, "Error"),
        }
    }
}

impl InspectionResult {
    /// Creates a successful result
    pub fn success(url: impl Into<String>, status: IndexStatus) -> Self {
        Self {
            url: url.into(),
            outcome: InspectionOutcome::Success(status),
        }
    }

    /// Creates a failed result
    pub fn error(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcome: InspectionOutcome::Error(message.into()),
        }
    }

    /// The index status, if the inspection succeeded
    pub fn index_status(&self) -> Option<&IndexStatus> {
        match &self.outcome {
            InspectionOutcome::Success(status) => Some(status),
            InspectionOutcome::Error(_) => None,
        }
    }

    /// The error message, if the inspection failed
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            InspectionOutcome::Success(_) => None,
            InspectionOutcome::Error(message) => Some(message),
        }
    }

    /// Classifies the result as indexed, not indexed, or error
    pub fn class(&self) -> ResultClass {
        match &self.outcome {
            InspectionOutcome::Success(status) if status.is_indexed() => ResultClass::Indexed,
            InspectionOutcome::Success(_) => ResultClass::NotIndexed,
            InspectionOutcome::Error(_) => ResultClass::Error,
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.class() == ResultClass::Indexed
    }

    /// Human-readable status: the coverage state, or "Error"
    pub fn status_label(&self) -> &str {
        match &self.outcome {
            InspectionOutcome::Success(status) => {
                status.coverage_state.as_deref().unwrap_or("Unknown")
            }
            InspectionOutcome::Error(_) => "Error",
        }
    }
}
