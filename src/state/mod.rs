//! State module for tracking job progress
//!
//! # Components
//!
//! - `Job`: the record the control loop mutates batch by batch
//! - `JobStatus`: lifecycle status, with database string conversions
//! - `JobProgress`: the progress surface published after every batch

mod job;
mod job_status;
mod progress;

pub use job::Job;
pub use job_status::JobStatus;
pub use progress::JobProgress;
