//! Mapsweep main entry point
//!
//! Command-line interface for the Mapsweep scrape-job orchestrator.

use clap::Parser;
use mapsweep::config::load_config_with_hash;
use mapsweep::orchestrator::run_orchestrator;
use mapsweep::storage::{DurableQueue, ResultStore, SqliteBackend};
use mapsweep::url::is_place_url;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Mapsweep: a resilient scrape-job orchestrator for map place pages
///
/// Mapsweep pops place-detail URLs from a durable task queue, hands
/// them to a bounded worker engine, and guarantees no job is silently
/// lost across restarts or termination signals.
#[derive(Parser, Debug)]
#[command(name = "mapsweep")]
#[command(version = "1.0.0")]
#[command(about = "A resilient scrape-job orchestrator for map place pages", long_about = None)]
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

    /// Validate config and show effective settings without running
    #[arg(long, conflicts_with_all = ["stats", "enqueue"])]
    dry_run: bool,

    /// Show queue depths and result counts from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "enqueue"])]
    stats: bool,

    /// Push a place URL onto the task queue and exit (repeatable)
    #[arg(long, value_name = "URL")]
    enqueue: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if !cli.enqueue.is_empty() {
        handle_enqueue(&config, &cli.enqueue)?;
    } else {
        handle_run(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mapsweep=info,warn"),
            1 => EnvFilter::new("mapsweep=debug,info"),
            2 => EnvFilter::new("mapsweep=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &mapsweep::Config) {
    println!("=== Mapsweep Dry Run ===\n");

    println!("Orchestrator:");
    println!(
        "  Backpressure ceiling: {}",
        config.orchestrator.backpressure_ceiling
    );
    println!(
        "  Dispatch interval: {}ms",
        config.orchestrator.dispatch_interval_ms
    );
    println!(
        "  Empty-queue wait: {}ms",
        config.orchestrator.empty_queue_wait_ms
    );
    println!("  Busy wait: {}ms", config.orchestrator.busy_wait_ms);

    println!("\nEngine:");
    println!(
        "  Concurrency: {}..{}",
        config.engine.min_concurrency, config.engine.max_concurrency
    );
    println!("  Max request retries: {}", config.engine.max_request_retries);
    println!("  Handler timeout: {}s", config.engine.handler_timeout_secs);

    println!("\nQueues:");
    println!("  Database: {}", config.queue.database_path);
    println!("  Task queue: {}", config.queue.task_queue);
    println!("  Dead-letter queue: {}", config.queue.dead_letter_queue);

    println!("\nTarget:");
    println!("  Place URL marker: {}", config.target.place_url_marker);
    println!("  Fixed query: {}", config.target.fixed_query);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    match &config.http.proxy_host {
        Some(host) => println!("  Proxy: {}", host),
        None => println!("  Proxy: none"),
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows queue depths and result counts
fn handle_stats(config: &mapsweep::Config) -> Result<(), Box<dyn std::error::Error>> {
    let backend = SqliteBackend::new(Path::new(&config.queue.database_path))?;

    println!("Database: {}\n", config.queue.database_path);
    println!(
        "Task queue depth:        {}",
        backend.len(&config.queue.task_queue)?
    );
    println!(
        "Dead-letter queue depth: {}",
        backend.len(&config.queue.dead_letter_queue)?
    );
    println!("Stored places:           {}", backend.count()?);

    Ok(())
}

/// Handles the --enqueue mode: seeds the task queue with place URLs
fn handle_enqueue(
    config: &mapsweep::Config,
    urls: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut backend = SqliteBackend::new(Path::new(&config.queue.database_path))?;

    for url in urls {
        if !is_place_url(url, &config.target.place_url_marker) {
            tracing::warn!("{} does not look like a place URL, queueing anyway", url);
        }
        backend.push(&config.queue.task_queue, url)?;
    }

    println!("✓ Queued {} URL(s) on {}", urls.len(), config.queue.task_queue);
    Ok(())
}

/// Handles the main orchestrator run
async fn handle_run(config: mapsweep::Config) -> Result<(), Box<dyn std::error::Error>> {
    // Uncaught faults get a log line before unwinding; the dispatch
    // loop itself converts all errors into queue placements, so this
    // only fires for bugs.
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("Uncaught panic: {}", info);
    }));

    match run_orchestrator(config).await {
        Ok(()) => {
            tracing::info!("Orchestrator stopped");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Orchestrator failed: {}", e);
            Err(e.into())
        }
    }
}
