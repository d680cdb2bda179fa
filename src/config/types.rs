use serde::Deserialize;

/// Default Search Console API root
pub const DEFAULT_API_ENDPOINT: &str = "https://searchconsole.googleapis.com";

/// Default environment variable holding the OAuth access token
pub const DEFAULT_TOKEN_ENV: &str = "SEARCH_CONSOLE_TOKEN";

/// Main configuration structure for Sumi-Inspect
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub inspector: InspectorConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    pub output: OutputConfig,
}

/// How the inspection scope is derived from the first URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyKind {
    /// `https://example.com/` style URL-prefix property
    #[default]
    UrlPrefix,
    /// `sc-domain:example.com` style domain property
    Domain,
}

/// Inspection API client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InspectorConfig {
    /// Root of the inspection API (overridable for tests and proxies)
    #[serde(rename = "api-endpoint", default = "default_api_endpoint")]
    pub api_endpoint: String,

    /// Environment variable the bearer token is read from
    #[serde(rename = "access-token-env", default = "default_token_env")]
    pub access_token_env: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Property flavour used for the `siteUrl` scope
    #[serde(rename = "property-kind", default)]
    pub property_kind: PropertyKind,

    /// Optional User-Agent override
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

/// Batch scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// URLs inspected concurrently per batch
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Delay between consecutive batches (milliseconds)
    #[serde(rename = "batch-delay-ms", default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Completed results between periodic checkpoints
    #[serde(rename = "checkpoint-interval", default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,

    /// Sleep between pause-flag polls (milliseconds)
    #[serde(rename = "pause-poll-ms", default = "default_pause_poll_ms")]
    pub pause_poll_ms: u64,

    /// Maximum URLs accepted for a single job
    #[serde(rename = "max-urls", default = "default_max_urls")]
    pub max_urls: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite checkpoint database
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// Path to the CSV export file
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_batch_size() -> usize {
    20
}

fn default_batch_delay_ms() -> u64 {
    1000
}

fn default_checkpoint_interval() -> usize {
    1000
}

fn default_pause_poll_ms() -> u64 {
    100
}

fn default_max_urls() -> usize {
    50_000
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            access_token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
            property_kind: PropertyKind::default(),
            user_agent: None,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            checkpoint_interval: default_checkpoint_interval(),
            pause_poll_ms: default_pause_poll_ms(),
            max_urls: default_max_urls(),
        }
    }
}
