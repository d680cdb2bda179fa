//! Sumi-Inspect main entry point
//!
//! This is the command-line interface for the Sumi-Inspect bulk URL inspector.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_inspect::config::{load_config_with_hash, Config};
use sumi_inspect::inspection::{EnvToken, InspectionResult, SearchConsoleInspector};
use sumi_inspect::output::{
    aggregate, export_csv, generate_markdown_summary, observed_directories, print_statistics,
    DirectoryFilter, JobReport, ResultFilter, StatusFilter, DEFAULT_DISPLAY_LIMIT,
};
use sumi_inspect::storage::{open_storage, Checkpoint, CheckpointStore};
use sumi_inspect::url::{derive_site_url, parse_url_list, validate_url_list};
use sumi_inspect::{Job, JobController, JobHandle, JobStatus};
use tracing_subscriber::EnvFilter;

/// Sumi-Inspect: a polite bulk URL inspector
///
/// Sumi-Inspect sends a list of URLs through the Search Console URL
/// Inspection API in rate-limited batches, checkpoints progress so an
/// interrupted job can be resumed, and summarizes index coverage.
#[derive(Parser, Debug)]
#[command(name = "sumi-inspect")]
#[command(version)]
#[command(about = "A polite bulk URL inspector", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// File with one URL per line
    #[arg(long, value_name = "FILE")]
    urls: Option<PathBuf>,

    /// Continue a checkpointed job (requires --urls with the same list)
    #[arg(long, value_name = "JOB_ID", requires = "urls")]
    resume: Option<String>,

    /// Validate config and URL list without inspecting anything
    #[arg(long, requires = "urls", conflicts_with_all = ["resume", "stats", "export", "list"])]
    dry_run: bool,

    /// Show statistics for a checkpointed job and exit
    #[arg(long, value_name = "JOB_ID", conflicts_with_all = ["resume", "export", "list"])]
    stats: Option<String>,

    /// Write CSV and markdown for a checkpointed job and exit
    #[arg(long, value_name = "JOB_ID", conflicts_with_all = ["resume", "stats", "list"])]
    export: Option<String>,

    /// List stored checkpoints and exit
    #[arg(long)]
    list: bool,

    /// Only list results with this status (all, indexed, not-indexed, error)
    #[arg(long, default_value = "all")]
    status: StatusFilter,

    /// Only list results under this top-level directory
    #[arg(long, value_name = "DIR")]
    directory: Option<String>,

    /// Only list results whose URL contains this text (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,
}

impl Cli {
    fn result_filter(&self) -> ResultFilter {
        let mut filter = ResultFilter::new().with_status(self.status);
        if let Some(dir) = &self.directory {
            filter = filter.with_directory(DirectoryFilter::only(dir));
        }
        if let Some(search) = &self.search {
            filter = filter.with_search(search.clone());
        }
        filter
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let filter = cli.result_filter();

    // Handle different modes
    if cli.list {
        handle_list(&config)
    } else if let Some(job_id) = &cli.stats {
        handle_stats(&config, job_id, &filter)
    } else if let Some(job_id) = &cli.export {
        handle_export(&config, job_id)
    } else {
        let Some(urls_path) = &cli.urls else {
            bail!("--urls is required to start or resume a job");
        };
        let urls = load_urls(urls_path)?;

        if cli.dry_run {
            handle_dry_run(&config, &urls)
        } else {
            handle_run(config, urls, cli.resume.as_deref(), &filter).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_inspect=info,warn"),
            1 => EnvFilter::new("sumi_inspect=debug,info"),
            2 => EnvFilter::new("sumi_inspect=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load_urls(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL list {}", path.display()))?;
    let urls = parse_url_list(&content);
    tracing::info!("Loaded {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

fn open_checkpoint_store(config: &Config) -> anyhow::Result<Arc<dyn CheckpointStore>> {
    let path = Path::new(&config.output.database_path);
    let store = open_storage(path)
        .with_context(|| format!("Failed to open checkpoint database {}", path.display()))?;
    Ok(Arc::new(store))
}

fn load_checkpoint(config: &Config, job_id: &str) -> anyhow::Result<Checkpoint> {
    let store = open_checkpoint_store(config)?;
    store
        .load(job_id)
        .with_context(|| format!("Failed to load checkpoint {}", job_id))?
        .with_context(|| format!("No checkpoint found for job {}", job_id))
}

/// Handles the --dry-run mode: validates config and URL list
fn handle_dry_run(config: &Config, urls: &[String]) -> anyhow::Result<()> {
    println!("=== Sumi-Inspect Dry Run ===\n");

    println!("Inspector Configuration:");
    println!("  API endpoint: {}", config.inspector.api_endpoint);
    println!("  Token variable: {}", config.inspector.access_token_env);
    println!("  Timeout: {}s", config.inspector.timeout_secs);
    println!("  Property kind: {:?}", config.inspector.property_kind);

    println!("\nScheduler:");
    println!("  Batch size: {}", config.scheduler.batch_size);
    println!("  Batch delay: {}ms", config.scheduler.batch_delay_ms);
    println!(
        "  Checkpoint interval: {} URLs",
        config.scheduler.checkpoint_interval
    );
    println!("  Max URLs: {}", config.scheduler.max_urls);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);
    println!("  CSV: {}", config.output.csv_path);

    validate_url_list(urls, config.scheduler.max_urls)?;
    let site_url = derive_site_url(urls[0].trim(), config.inspector.property_kind)?;

    let batch_size = config.scheduler.batch_size.max(1);
    let batches = (urls.len() + batch_size - 1) / batch_size;
    let minimum_secs =
        batches.saturating_sub(1) as u64 * config.scheduler.batch_delay_ms / 1000;

    println!("\n✓ Configuration is valid");
    println!("✓ Would inspect {} URLs for {}", urls.len(), site_url);
    println!(
        "✓ {} batches, at least {} minutes of inter-batch delay",
        batches,
        minimum_secs / 60
    );

    Ok(())
}

/// Handles the --list mode: shows stored checkpoints
fn handle_list(config: &Config) -> anyhow::Result<()> {
    let store = open_checkpoint_store(config)?;
    let summaries = store.list().context("Failed to list checkpoints")?;

    if summaries.is_empty() {
        println!("No checkpoints in {}", config.output.database_path);
        return Ok(());
    }

    println!("=== Checkpoints ===\n");
    for summary in summaries {
        println!(
            "{}  {:<9}  {}/{}  {}  (updated {})",
            summary.job_id,
            summary.status,
            summary.completed_urls,
            summary.total_urls,
            summary.site_url,
            summary.updated_at.to_rfc3339()
        );
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from a checkpoint
fn handle_stats(config: &Config, job_id: &str, filter: &ResultFilter) -> anyhow::Result<()> {
    let checkpoint = load_checkpoint(config, job_id)?;

    println!("Job: {} ({})", checkpoint.job_id, checkpoint.status);
    println!(
        "Progress: {}/{} URLs\n",
        checkpoint.completed_urls, checkpoint.total_urls
    );
    if let Some(failure) = &checkpoint.failure {
        println!("Failure: {}\n", failure);
    }

    print_statistics(&aggregate(&checkpoint.results));
    print_listing(&checkpoint.results, filter);

    Ok(())
}

/// Handles the --export mode: writes CSV and markdown from a checkpoint
fn handle_export(config: &Config, job_id: &str) -> anyhow::Result<()> {
    let checkpoint = load_checkpoint(config, job_id)?;

    println!("=== Exporting Job {} ===\n", job_id);
    write_outputs(
        config,
        &JobReport::from_checkpoint(&checkpoint),
        &checkpoint.results,
    )
}

/// Runs a new job, or resumes one, and writes the outputs
async fn handle_run(
    config: Config,
    urls: Vec<String>,
    resume: Option<&str>,
    filter: &ResultFilter,
) -> anyhow::Result<()> {
    let store = open_checkpoint_store(&config)?;

    let tokens = Arc::new(EnvToken::new(config.inspector.access_token_env.clone()));
    let inspector = SearchConsoleInspector::new(&config.inspector, tokens)
        .context("Failed to build HTTP client")?;

    let controller = JobController::new(
        Arc::new(inspector),
        Arc::clone(&store),
        config.scheduler.clone(),
    )
    .with_property_kind(config.inspector.property_kind);

    let handle = controller.handle();
    spawn_interrupt_handler(handle.clone());
    spawn_progress_reporter(handle);

    let job = match resume {
        Some(job_id) => {
            let checkpoint = store
                .load(job_id)
                .with_context(|| format!("Failed to load checkpoint {}", job_id))?
                .with_context(|| format!("No checkpoint found for job {}", job_id))?;
            controller.resume(checkpoint, urls).await?
        }
        None => controller.run(urls).await?,
    };

    println!(
        "\nJob {} finished: {} ({}/{} URLs)\n",
        job.id(),
        job.status(),
        job.completed(),
        job.total()
    );

    let report = JobReport::from_job(&job);
    print_statistics(&report.summary);
    print_listing(job.results(), filter);
    write_outputs(&config, &report, job.results())?;

    finish(&job)
}

fn finish(job: &Job) -> anyhow::Result<()> {
    match job.status() {
        JobStatus::Failed => bail!(
            "Job {} failed: {}",
            job.id(),
            job.failure().unwrap_or("unknown fault")
        ),
        JobStatus::Cancelled => {
            println!(
                "Resume later with: --resume {} --urls <same file>",
                job.id()
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Cancels the job on Ctrl-C
fn spawn_interrupt_handler(handle: JobHandle) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current batch");
            if let Err(e) = handle.cancel() {
                tracing::debug!("Cancel ignored: {}", e);
            }
        }
    });
}

/// Logs progress every 10 percentage points
fn spawn_progress_reporter(handle: JobHandle) {
    tokio::spawn(async move {
        let mut rx = handle.subscribe();
        let mut last_step = 0u64;

        while rx.changed().await.is_ok() {
            let progress = *rx.borrow_and_update();
            let step = (progress.percentage / 10.0).floor() as u64;
            if step > last_step && progress.current < progress.total {
                last_step = step;
                tracing::info!(
                    "{}/{} URLs ({:.1}%), about {} min left",
                    progress.current,
                    progress.total,
                    progress.percentage,
                    progress.estimated_time_minutes
                );
            }
        }
    });
}

fn print_listing(results: &[InspectionResult], filter: &ResultFilter) {
    if filter.is_unfiltered() {
        return;
    }

    let matches = filter.apply(results);
    println!("=== Matching Results ===\n");

    for result in matches.iter().take(DEFAULT_DISPLAY_LIMIT) {
        match result.error_message() {
            Some(error) => println!("  {}  Error: {}", result.url, error),
            None => println!("  {}  {}", result.url, result.status_label()),
        }
    }

    if matches.len() > DEFAULT_DISPLAY_LIMIT {
        println!(
            "\n  Showing first {} of {} matching results",
            DEFAULT_DISPLAY_LIMIT,
            matches.len()
        );
    } else {
        println!("\n  {} matching results", matches.len());
    }

    if let DirectoryFilter::Only(dir) = &filter.directory {
        if matches.is_empty() {
            println!(
                "  No results under {}; known directories: {}",
                dir,
                observed_directories(results).join(", ")
            );
        }
    }
    println!();
}

fn write_outputs(
    config: &Config,
    report: &JobReport,
    results: &[InspectionResult],
) -> anyhow::Result<()> {
    let summary_path = Path::new(&config.output.summary_path);
    generate_markdown_summary(report, summary_path)
        .with_context(|| format!("Failed to write summary {}", summary_path.display()))?;
    println!("✓ Summary written to: {}", summary_path.display());

    let csv_path = Path::new(&config.output.csv_path);
    export_csv(results, csv_path)
        .with_context(|| format!("Failed to write CSV {}", csv_path.display()))?;
    println!("✓ Results exported to: {}", csv_path.display());

    Ok(())
}
