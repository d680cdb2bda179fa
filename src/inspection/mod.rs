//! Inspection client module
//!
//! An `Inspector` turns one URL plus the job's scope into exactly one
//! normalized `InspectionResult`. Implementations never fail past their own
//! boundary: every transport, auth, quota or decoding problem becomes the
//! result's error outcome.

mod client;
mod credentials;
mod types;

pub use client::{build_http_client, SearchConsoleInspector, INSPECT_PATH};
pub use credentials::{EnvToken, StaticToken, TokenProvider};
pub use types::{
    IndexStatus, InspectionOutcome, InspectionResult, ResultClass, INDEXED_COVERAGE_STATE,
};

use async_trait::async_trait;

/// Inspects a single URL against an indexing-status backend
#[async_trait]
pub trait Inspector: Send + Sync {
    /// Inspects `url` within the `site_url` property
    async fn inspect(&self, url: &str, site_url: &str) -> InspectionResult;
}
