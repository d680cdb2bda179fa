//! Job controller - the batch dispatch loop
//!
//! This module contains the control loop that drives one job from start to a
//! terminal status, including:
//! - Partitioning the URL list into fixed-size batches
//! - Fanning each batch out to the inspector and joining it in slice order
//! - Honoring pause and cancel requests between batches
//! - Publishing progress and writing checkpoints

use crate::config::{PropertyKind, SchedulerConfig};
use crate::inspection::{InspectionResult, Inspector};
use crate::scheduler::control::{JobControl, JobHandle};
use crate::scheduler::ControlError;
use crate::state::{Job, JobProgress, JobStatus};
use crate::storage::{Checkpoint, CheckpointStore};
use crate::url::{derive_site_url, validate_url_list};
use crate::{InspectError, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Drives a single inspection job
pub struct JobController {
    inspector: Arc<dyn Inspector>,
    store: Arc<dyn CheckpointStore>,
    config: SchedulerConfig,
    property_kind: PropertyKind,
    control: Arc<JobControl>,
}

/// How a dispatch loop ended
enum LoopExit {
    Completed,
    Cancelled,
    Fault(String),
}

impl JobController {
    /// Creates a controller for one job
    ///
    /// # Arguments
    ///
    /// * `inspector` - Backend each URL is inspected against
    /// * `store` - Where checkpoints are written
    /// * `config` - Batch size, delays and checkpoint interval
    pub fn new(
        inspector: Arc<dyn Inspector>,
        store: Arc<dyn CheckpointStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            inspector,
            store,
            config,
            property_kind: PropertyKind::default(),
            control: Arc::new(JobControl::new()),
        }
    }

    /// Sets how the inspection scope is derived from the first URL
    pub fn with_property_kind(mut self, kind: PropertyKind) -> Self {
        self.property_kind = kind;
        self
    }

    /// Returns a command handle for this controller's job
    ///
    /// Take the handle before calling `run` or `resume`; both consume the
    /// controller.
    pub fn handle(&self) -> JobHandle {
        JobHandle::new(Arc::clone(&self.control))
    }

    /// Runs a new job over `urls` until it reaches a terminal status
    ///
    /// # Returns
    ///
    /// * `Ok(Job)` - The terminal job (completed, cancelled or failed)
    /// * `Err(InspectError)` - The URL list was rejected before the job started
    pub async fn run(self, urls: Vec<String>) -> Result<Job> {
        validate_url_list(&urls, self.config.max_urls)?;
        let site_url = derive_site_url(urls[0].trim(), self.property_kind)?;

        let job = Job::new(site_url, urls.len());
        tracing::info!(
            "Starting job {} for {} ({} URLs)",
            job.id(),
            job.site_url(),
            job.total()
        );

        self.drive(job, &urls).await
    }

    /// Continues a checkpointed job over the same URL list
    ///
    /// Only URLs after the checkpoint's completed prefix are inspected. The
    /// list must have the checkpoint's length and agree with every stored
    /// result's URL.
    pub async fn resume(self, checkpoint: Checkpoint, urls: Vec<String>) -> Result<Job> {
        validate_url_list(&urls, self.config.max_urls)?;
        check_resumable(&checkpoint, &urls)?;

        let mut job = Job::from_checkpoint(checkpoint);
        job.reopen();
        tracing::info!(
            "Resuming job {} at {}/{}",
            job.id(),
            job.completed(),
            job.total()
        );

        self.drive(job, &urls).await
    }

    async fn drive(self, mut job: Job, urls: &[String]) -> Result<Job> {
        if !self.control.begin() {
            return Err(ControlError::NotRunning(self.control.status()).into());
        }
        job.set_status(JobStatus::Running);

        let baseline = job.completed();
        self.control.publish(JobProgress::compute_since(
            baseline,
            baseline,
            job.total(),
            Duration::ZERO,
        ));

        let exit = self.dispatch_loop(&mut job, urls, baseline).await;

        let outcome = match &exit {
            LoopExit::Completed => JobStatus::Completed,
            LoopExit::Cancelled => JobStatus::Cancelled,
            LoopExit::Fault(_) => JobStatus::Failed,
        };
        let terminal = self.control.finish(outcome);

        match exit {
            LoopExit::Fault(message) => {
                tracing::error!("Job {} failed: {}", job.id(), message);
                job.fail(message);
            }
            _ if terminal == JobStatus::Cancelled => {
                job.set_status(JobStatus::Cancelled);
                tracing::info!(
                    "Job {} cancelled at {}/{}",
                    job.id(),
                    job.completed(),
                    job.total()
                );
            }
            _ => {
                job.set_status(JobStatus::Completed);
                tracing::info!("Job {} completed: {} URLs", job.id(), job.completed());
            }
        }

        self.write_checkpoint(&job).await;

        Ok(job)
    }

    async fn dispatch_loop(&self, job: &mut Job, urls: &[String], baseline: usize) -> LoopExit {
        let batch_size = self.config.batch_size.max(1);
        let interval = self.config.checkpoint_interval.max(1);
        let batch_delay = Duration::from_millis(self.config.batch_delay_ms);
        let site_url = job.site_url().to_string();

        let started = Instant::now();
        let mut paused_for = Duration::ZERO;

        loop {
            if job.remaining() == 0 {
                return LoopExit::Completed;
            }

            paused_for += self.wait_while_paused(job).await;

            if self.control.is_cancelled() {
                return LoopExit::Cancelled;
            }

            let start = job.completed();
            let end = (start + batch_size).min(job.total());
            let slice = &urls[start..end];

            tracing::debug!("Dispatching batch of {} URLs ({}..{})", slice.len(), start, end);

            match self.dispatch_batch(slice, &site_url).await {
                Ok(batch) => job.append_batch(batch),
                Err(message) => return LoopExit::Fault(message),
            }

            let completed = job.completed();
            let elapsed = started.elapsed().saturating_sub(paused_for);
            let progress = JobProgress::compute_since(completed, baseline, job.total(), elapsed);
            self.control.publish(progress);

            if job.remaining() == 0 {
                continue;
            }

            if start / interval < completed / interval {
                tracing::info!(
                    "Progress: {}/{} ({:.1}%), ~{} min remaining",
                    completed,
                    job.total(),
                    progress.percentage,
                    progress.estimated_time_minutes
                );
                self.write_checkpoint(job).await;
            }

            tokio::select! {
                _ = self.control.cancel_token().cancelled() => {}
                _ = tokio::time::sleep(batch_delay) => {}
            }
        }
    }

    /// Blocks while the job is paused; returns how long it waited
    async fn wait_while_paused(&self, job: &mut Job) -> Duration {
        if !self.control.is_paused() {
            return Duration::ZERO;
        }

        tracing::info!("Job {} paused at {}/{}", job.id(), job.completed(), job.total());
        job.set_status(JobStatus::Paused);

        let poll = Duration::from_millis(self.config.pause_poll_ms);
        let since = Instant::now();

        while self.control.is_paused() {
            tokio::select! {
                _ = self.control.cancel_token().cancelled() => break,
                _ = tokio::time::sleep(poll) => {}
            }
        }

        if !self.control.is_cancelled() {
            tracing::info!("Job {} resumed", job.id());
            job.set_status(JobStatus::Running);
        }

        since.elapsed()
    }

    /// Inspects one slice concurrently and returns results in slice order
    async fn dispatch_batch(
        &self,
        slice: &[String],
        site_url: &str,
    ) -> std::result::Result<Vec<InspectionResult>, String> {
        let tasks = slice.iter().map(|url| {
            let inspector = Arc::clone(&self.inspector);
            let url = url.clone();
            let site_url = site_url.to_string();
            tokio::spawn(async move { inspector.inspect(&url, &site_url).await })
        });

        let joined = join_all(tasks).await;
        if joined.len() != slice.len() {
            return Err(format!(
                "batch returned {} results for {} URLs",
                joined.len(),
                slice.len()
            ));
        }

        let mut results = Vec::with_capacity(slice.len());
        for (url, outcome) in slice.iter().zip(joined) {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => return Err(format!("inspection task for {} failed: {}", url, e)),
            }
        }

        Ok(results)
    }

    /// Persists the job on the blocking pool; failures are only logged
    async fn write_checkpoint(&self, job: &Job) {
        let store = Arc::clone(&self.store);
        let checkpoint = job.to_checkpoint();
        let job_id = checkpoint.job_id.clone();

        match tokio::task::spawn_blocking(move || store.save(&checkpoint)).await {
            Ok(Ok(())) => tracing::debug!("Checkpoint written for job {}", job_id),
            Ok(Err(e)) => tracing::warn!("Failed to write checkpoint for job {}: {}", job_id, e),
            Err(e) => tracing::warn!("Checkpoint task for job {} failed: {}", job_id, e),
        }
    }
}

/// Checks that a checkpoint can be continued with `urls`
fn check_resumable(checkpoint: &Checkpoint, urls: &[String]) -> Result<()> {
    let reject = |reason: String| InspectError::Resume {
        job_id: checkpoint.job_id.clone(),
        reason,
    };

    if checkpoint.status == JobStatus::Completed {
        return Err(reject("job already completed".to_string()));
    }

    if urls.len() != checkpoint.total_urls {
        return Err(reject(format!(
            "URL list has {} entries, checkpoint expects {}",
            urls.len(),
            checkpoint.total_urls
        )));
    }

    if let Some((index, result)) = checkpoint
        .results
        .iter()
        .enumerate()
        .find(|(i, result)| urls[*i] != result.url)
    {
        return Err(reject(format!(
            "URL #{} is {} but the checkpoint has {}",
            index + 1,
            urls[index],
            result.url
        )));
    }

    Ok(())
}
