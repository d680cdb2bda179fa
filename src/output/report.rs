//! Job report: run metadata plus aggregated statistics

use crate::output::stats::{aggregate, InspectionSummary};
use crate::state::{Job, JobStatus};
use crate::storage::Checkpoint;
use chrono::{DateTime, Utc};

/// Everything the summary writers need about one job
#[derive(Debug, Clone)]
pub struct JobReport {
    // Run metadata
    pub job_id: String,
    pub site_url: String,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_urls: usize,
    pub completed_urls: usize,
    pub failure: Option<String>,

    // Statistics over the results gathered so far
    pub summary: InspectionSummary,
}

impl JobReport {
    pub fn from_job(job: &Job) -> Self {
        Self {
            job_id: job.id().to_string(),
            site_url: job.site_url().to_string(),
            status: job.status(),
            started_at: job.started_at(),
            updated_at: job.updated_at(),
            total_urls: job.total(),
            completed_urls: job.completed(),
            failure: job.failure().map(str::to_string),
            summary: aggregate(job.results()),
        }
    }

    pub fn from_checkpoint(checkpoint: &Checkpoint) -> Self {
        Self {
            job_id: checkpoint.job_id.clone(),
            site_url: checkpoint.site_url.clone(),
            status: checkpoint.status,
            started_at: checkpoint.started_at,
            updated_at: checkpoint.updated_at,
            total_urls: checkpoint.total_urls,
            completed_urls: checkpoint.completed_urls,
            failure: checkpoint.failure.clone(),
            summary: aggregate(&checkpoint.results),
        }
    }

    /// Wall-clock seconds between start and the last update
    pub fn duration_seconds(&self) -> u64 {
        (self.updated_at - self.started_at).num_seconds().max(0) as u64
    }

    /// Share of the URL list that has been inspected
    pub fn completion_pct(&self) -> f64 {
        if self.total_urls == 0 {
            0.0
        } else {
            self.completed_urls as f64 / self.total_urls as f64 * 100.0
        }
    }
}
