//! Configuration module for Sumi-Inspect
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_inspect::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("inspect.toml")).unwrap();
//! println!("Batches of {} URLs", config.scheduler.batch_size);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, InspectorConfig, OutputConfig, PropertyKind, SchedulerConfig, DEFAULT_API_ENDPOINT,
    DEFAULT_TOKEN_ENV,
};
pub use validation::MAX_URLS_LIMIT;

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
