//! Pause/resume/cancel state machine shared between a job and its handles

use crate::state::{JobProgress, JobStatus};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Rejected job commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("Job has already finished ({0})")]
    Terminal(JobStatus),

    #[error("Job is not running ({0})")]
    NotRunning(JobStatus),
}

/// Shared control state for one job
///
/// The control loop drives `begin`, `publish` and `finish`; handles drive
/// `pause`, `resume` and `cancel`.
pub(crate) struct JobControl {
    status: Mutex<JobStatus>,
    cancel: CancellationToken,
    progress: watch::Sender<JobProgress>,
}

impl JobControl {
    pub(crate) fn new() -> Self {
        let (progress, _) = watch::channel(JobProgress::initial(0));
        Self {
            status: Mutex::new(JobStatus::Pending),
            cancel: CancellationToken::new(),
            progress,
        }
    }

    // A poisoned lock still holds a valid status, so recover it.
    fn lock(&self) -> MutexGuard<'_, JobStatus> {
        self.status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn status(&self) -> JobStatus {
        *self.lock()
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.status() == JobStatus::Paused
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    // ===== Control Loop Transitions =====

    /// Moves a pending job to running; returns false if it was not pending
    pub(crate) fn begin(&self) -> bool {
        let mut status = self.lock();
        if *status == JobStatus::Pending {
            *status = JobStatus::Running;
            true
        } else {
            false
        }
    }

    /// Records the terminal status and returns it
    ///
    /// A cancel accepted while the last batch was in flight turns a
    /// completion into a cancellation. `cancel` trips the token under the
    /// same lock, so a command either lands before this point or is
    /// rejected as terminal.
    pub(crate) fn finish(&self, outcome: JobStatus) -> JobStatus {
        let mut status = self.lock();
        let terminal = if outcome == JobStatus::Completed && self.cancel.is_cancelled() {
            JobStatus::Cancelled
        } else {
            outcome
        };
        *status = terminal;
        terminal
    }

    pub(crate) fn publish(&self, progress: JobProgress) {
        self.progress.send_replace(progress);
    }

    pub(crate) fn progress(&self) -> JobProgress {
        *self.progress.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<JobProgress> {
        self.progress.subscribe()
    }

    // ===== Commands =====

    pub(crate) fn pause(&self) -> Result<(), ControlError> {
        let mut status = self.lock();
        let current = *status;
        match current {
            JobStatus::Running | JobStatus::Paused => {
                *status = JobStatus::Paused;
                Ok(())
            }
            JobStatus::Pending => Err(ControlError::NotRunning(JobStatus::Pending)),
            terminal => Err(ControlError::Terminal(terminal)),
        }
    }

    pub(crate) fn resume(&self) -> Result<(), ControlError> {
        let mut status = self.lock();
        let current = *status;
        match current {
            JobStatus::Running | JobStatus::Paused => {
                *status = JobStatus::Running;
                Ok(())
            }
            JobStatus::Pending => Err(ControlError::NotRunning(JobStatus::Pending)),
            terminal => Err(ControlError::Terminal(terminal)),
        }
    }

    pub(crate) fn cancel(&self) -> Result<(), ControlError> {
        let status = self.lock();
        if status.is_terminal() {
            return Err(ControlError::Terminal(*status));
        }
        self.cancel.cancel();
        Ok(())
    }
}

/// Cloneable command surface for a running job
///
/// Commands are safe to issue from any task or thread. Pausing and cancelling
/// take effect at the next batch boundary; a batch already in flight always
/// finishes.
#[derive(Clone)]
pub struct JobHandle {
    control: Arc<JobControl>,
}

impl JobHandle {
    pub(crate) fn new(control: Arc<JobControl>) -> Self {
        Self { control }
    }

    /// Suspends dispatch before the next batch
    pub fn pause(&self) -> Result<(), ControlError> {
        self.control.pause()?;
        tracing::info!("Pause requested");
        Ok(())
    }

    /// Continues a paused job from the next unprocessed batch
    pub fn resume(&self) -> Result<(), ControlError> {
        self.control.resume()?;
        tracing::info!("Resume requested");
        Ok(())
    }

    /// Stops the job for good; accumulated results are kept
    pub fn cancel(&self) -> Result<(), ControlError> {
        self.control.cancel()?;
        tracing::info!("Cancellation requested");
        Ok(())
    }

    pub fn status(&self) -> JobStatus {
        self.control.status()
    }

    /// Latest published progress
    pub fn progress(&self) -> JobProgress {
        self.control.progress()
    }

    /// Receiver that is notified after every batch
    pub fn subscribe(&self) -> watch::Receiver<JobProgress> {
        self.control.subscribe()
    }

    pub fn is_cancelled(&self) -> bool {
        self.control.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> (Arc<JobControl>, JobHandle) {
        let control = Arc::new(JobControl::new());
        (control.clone(), JobHandle::new(control))
    }

    #[test]
    fn test_pending_job_rejects_pause_and_resume() {
        let (_, handle) = handle();
        assert_eq!(
            handle.pause(),
            Err(ControlError::NotRunning(JobStatus::Pending))
        );
        assert_eq!(
            handle.resume(),
            Err(ControlError::NotRunning(JobStatus::Pending))
        );
    }

    #[test]
    fn test_pause_resume_cycle() {
        let (control, handle) = handle();
        assert!(control.begin());

        handle.pause().unwrap();
        assert_eq!(handle.status(), JobStatus::Paused);
        assert!(control.is_paused());

        // idempotent
        handle.pause().unwrap();

        handle.resume().unwrap();
        assert_eq!(handle.status(), JobStatus::Running);
    }

    #[test]
    fn test_terminal_job_rejects_commands() {
        let (control, handle) = handle();
        control.begin();
        control.finish(JobStatus::Completed);

        assert_eq!(
            handle.pause(),
            Err(ControlError::Terminal(JobStatus::Completed))
        );
        assert_eq!(
            handle.resume(),
            Err(ControlError::Terminal(JobStatus::Completed))
        );
        assert_eq!(
            handle.cancel(),
            Err(ControlError::Terminal(JobStatus::Completed))
        );
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_cancel_accepted_before_start() {
        let (control, handle) = handle();
        handle.cancel().unwrap();
        assert!(control.is_cancelled());
        assert_eq!(handle.status(), JobStatus::Pending);
    }

    #[test]
    fn test_cancel_during_last_batch_wins_over_completion() {
        let (control, handle) = handle();
        control.begin();
        handle.cancel().unwrap();

        assert_eq!(control.finish(JobStatus::Completed), JobStatus::Cancelled);
        assert_eq!(handle.status(), JobStatus::Cancelled);
    }

    #[test]
    fn test_finish_keeps_failure_after_cancel() {
        let (control, handle) = handle();
        control.begin();
        handle.cancel().unwrap();

        assert_eq!(control.finish(JobStatus::Failed), JobStatus::Failed);
    }

    #[test]
    fn test_begin_only_once() {
        let (control, _) = handle();
        assert!(control.begin());
        assert!(!control.begin());
    }

    #[test]
    fn test_progress_is_broadcast() {
        let (control, handle) = handle();
        let rx = handle.subscribe();
        control.publish(JobProgress::compute(5, 10, std::time::Duration::from_secs(1)));

        assert_eq!(rx.borrow().current, 5);
        assert_eq!(handle.progress().total, 10);
    }
}
