//! The job record owned by the control loop

use crate::inspection::InspectionResult;
use crate::state::JobStatus;
use crate::storage::Checkpoint;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One run of the inspector over a URL list
///
/// `completed` is always `results.len()`. The record is only mutated by the
/// scheduler and never changes once its status is terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    id: String,
    status: JobStatus,
    site_url: String,
    total: usize,
    results: Vec<InspectionResult>,
    started_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    failure: Option<String>,
}

impl Job {
    /// Creates a pending job with a fresh id
    pub fn new(site_url: impl Into<String>, total: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            status: JobStatus::Pending,
            site_url: site_url.into(),
            total,
            results: Vec::with_capacity(total),
            started_at: now,
            updated_at: now,
            failure: None,
        }
    }

    /// Rebuilds a job from its last checkpoint
    pub fn from_checkpoint(checkpoint: Checkpoint) -> Self {
        Self {
            id: checkpoint.job_id,
            status: checkpoint.status,
            site_url: checkpoint.site_url,
            total: checkpoint.total_urls,
            results: checkpoint.results,
            started_at: checkpoint.started_at,
            updated_at: checkpoint.updated_at,
            failure: checkpoint.failure,
        }
    }

    /// Projects the job into a checkpoint
    pub fn to_checkpoint(&self) -> Checkpoint {
        Checkpoint {
            job_id: self.id.clone(),
            status: self.status,
            site_url: self.site_url.clone(),
            total_urls: self.total,
            completed_urls: self.completed(),
            results: self.results.clone(),
            started_at: self.started_at,
            updated_at: self.updated_at,
            failure: self.failure.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// URLs whose inspection has concluded
    pub fn completed(&self) -> usize {
        self.results.len()
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed())
    }

    pub fn results(&self) -> &[InspectionResult] {
        &self.results
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Fault message when the job ended as failed
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Makes a restored, unfinished job runnable again
    pub(crate) fn reopen(&mut self) {
        if self.status == JobStatus::Completed {
            return;
        }
        self.status = JobStatus::Pending;
        self.failure = None;
        self.touch();
    }

    pub(crate) fn set_status(&mut self, status: JobStatus) {
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.touch();
    }

    /// Appends a finished batch in slice order
    ///
    /// Results beyond `total` are dropped so `completed` never exceeds it.
    pub(crate) fn append_batch(&mut self, batch: Vec<InspectionResult>) {
        if self.status.is_terminal() {
            return;
        }
        let room = self.remaining();
        self.results.extend(batch.into_iter().take(room));
        self.touch();
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.failure = Some(message.into());
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
