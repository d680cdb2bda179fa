use serde::Serialize;
use std::time::Duration;

/// Progress surface published after every batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgress {
    /// URLs whose inspection has concluded
    pub current: usize,

    /// URLs in the job
    pub total: usize,

    /// `current / total * 100`
    pub percentage: f64,

    /// Remaining time extrapolated from the average time per URL so far
    pub estimated_time_minutes: u64,
}

impl JobProgress {
    /// Progress before any batch has finished
    pub fn initial(total: usize) -> Self {
        Self::compute(0, total, Duration::ZERO)
    }

    /// Computes progress and ETA
    ///
    /// The ETA is the running average of `elapsed / completed` multiplied by the
    /// remaining URL count, rounded up to whole minutes. With nothing completed
    /// yet there is no average and the ETA is zero.
    pub fn compute(completed: usize, total: usize, elapsed: Duration) -> Self {
        Self::compute_since(completed, 0, total, elapsed)
    }

    /// Like `compute`, but only the URLs past `baseline` count toward the
    /// average. A resumed job passes the count it was restored with.
    pub fn compute_since(completed: usize, baseline: usize, total: usize, elapsed: Duration) -> Self {
        let percentage = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let done_this_run = completed.saturating_sub(baseline);
        let estimated_time_minutes = if done_this_run > 0 {
            let per_url = elapsed.as_secs_f64() / done_this_run as f64;
            let remaining = total.saturating_sub(completed) as f64;
            (per_url * remaining / 60.0).ceil() as u64
        } else {
            0
        };

        Self {
            current: completed,
            total,
            percentage,
            estimated_time_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_progress() {
        let progress = JobProgress::initial(100);
        assert_eq!(progress.current, 0);
        assert_eq!(progress.percentage, 0.0);
        assert_eq!(progress.estimated_time_minutes, 0);
    }

    #[test]
    fn test_percentage() {
        let progress = JobProgress::compute(20, 45, Duration::from_secs(1));
        assert!((progress.percentage - 44.444).abs() < 0.01);

        let done = JobProgress::compute(45, 45, Duration::from_secs(3));
        assert_eq!(done.percentage, 100.0);
        assert_eq!(done.estimated_time_minutes, 0);
    }

    #[test]
    fn test_eta_from_running_average() {
        // 1,000 URLs in 50s -> 50ms each; 9,000 left -> 450s -> 7.5 min -> 8
        let progress = JobProgress::compute(1_000, 10_000, Duration::from_secs(50));
        assert_eq!(progress.estimated_time_minutes, 8);
    }

    #[test]
    fn test_eta_ignores_restored_results() {
        // 900 restored, 100 more in 60s -> 0.6s each; 1,000 left -> 10 min
        let progress = JobProgress::compute_since(1_000, 900, 2_000, Duration::from_secs(60));
        assert_eq!(progress.current, 1_000);
        assert_eq!(progress.estimated_time_minutes, 10);

        let fresh = JobProgress::compute_since(900, 900, 2_000, Duration::ZERO);
        assert_eq!(fresh.estimated_time_minutes, 0);
    }

    #[test]
    fn test_zero_total() {
        let progress = JobProgress::compute(0, 0, Duration::from_secs(5));
        assert_eq!(progress.percentage, 0.0);
        assert_eq!(progress.estimated_time_minutes, 0);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(JobProgress::compute(1, 2, Duration::from_secs(1))).unwrap();
        assert_eq!(json["current"], 1);
        assert_eq!(json["total"], 2);
        assert!(json.get("estimatedTimeMinutes").is_some());
    }
}
