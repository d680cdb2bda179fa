use crate::config::types::{Config, InspectorConfig, OutputConfig, SchedulerConfig};
use crate::ConfigError;
use url::Url;

/// Hard ceiling on the size of a single job
pub const MAX_URLS_LIMIT: usize = 50_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_inspector_config(&config.inspector)?;
    validate_scheduler_config(&config.scheduler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates inspection client configuration
fn validate_inspector_config(config: &InspectorConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.api_endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api_endpoint: {}", e)))?;

    if endpoint.scheme() != "https" && endpoint.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "api_endpoint must use http or https, got {}",
            endpoint.scheme()
        )));
    }

    if config.access_token_env.is_empty() {
        return Err(ConfigError::Validation(
            "access_token_env cannot be empty".to_string(),
        ));
    }

    if !config
        .access_token_env
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "access_token_env must be a valid environment variable name, got '{}'",
            config.access_token_env
        )));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates batch scheduling configuration
fn validate_scheduler_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 || config.batch_size > 100 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 100, got {}",
            config.batch_size
        )));
    }

    if config.checkpoint_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "checkpoint_interval must be >= 1, got {}",
            config.checkpoint_interval
        )));
    }

    if config.pause_poll_ms < 10 || config.pause_poll_ms > 5_000 {
        return Err(ConfigError::Validation(format!(
            "pause_poll_ms must be between 10 and 5000, got {}ms",
            config.pause_poll_ms
        )));
    }

    if config.max_urls < 1 || config.max_urls > MAX_URLS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_urls must be between 1 and {}, got {}",
            MAX_URLS_LIMIT, config.max_urls
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
