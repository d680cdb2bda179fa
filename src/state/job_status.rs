/// Job status definitions for tracking inspection progress
///
/// This module defines every status a job can be in over its lifetime.
use std::fmt;

/// Represents the current status of an inspection job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    // ===== Active States =====
    /// Job has been created but the control loop has not started
    Pending,

    /// Batches are being dispatched
    Running,

    /// Dispatch is suspended until resumed
    Paused,

    // ===== Terminal States =====
    /// Every URL has been inspected
    Completed,

    /// Stopped on request; partial results are kept
    Cancelled,

    /// Stopped by a controller-level fault; partial results are kept
    Failed,
}

impl JobStatus {
    /// Returns true if this is a terminal status (the job is immutable)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible statuses (useful for testing and iteration)
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Running,
            Self::Paused,
            Self::Completed,
            Self::Cancelled,
            Self::Failed,
        ]
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(JobStatus::Failed.is_terminal());

        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Paused.is_terminal());
    }

    #[test]
    fn test_roundtrip_db_string() {
        for status in JobStatus::all_states() {
            let parsed = JobStatus::from_db_string(status.to_db_string());
            assert_eq!(Some(status), parsed, "Failed roundtrip for {:?}", status);
        }
    }

    #[test]
    fn test_from_db_string_invalid() {
        assert_eq!(JobStatus::from_db_string("canceled"), None);
        assert_eq!(JobStatus::from_db_string(""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", JobStatus::Cancelled), "cancelled");
        assert_eq!(format!("{}", JobStatus::Running), "running");
    }
}
