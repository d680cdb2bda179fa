//! Scheduler module for running inspection jobs
//!
//! This module contains the batch dispatch loop and its command surface:
//! - Fixed-size batches fanned out concurrently, joined in input order
//! - An inter-batch delay to stay under the API's rate limit
//! - Pause, resume and cancel through a cloneable `JobHandle`
//! - Periodic and terminal checkpoint writes

mod control;
mod controller;

pub use control::{ControlError, JobHandle};
pub use controller::JobController;
