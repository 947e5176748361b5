//! Dex-Harvest main entry point
//!
//! This is the command-line interface for the Dex-Harvest base-stats harvester.

use clap::Parser;
use dex_harvest::config::{load_config_with_hash, validate, Config};
use dex_harvest::crawler::{harvest, Harvester};
use dex_harvest::storage::JsonRecordStore;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Dex-Harvest: an incremental base-stats harvester
///
/// Dex-Harvest reads a category index page, fetches the detail page of every
/// entry it has not stored yet, and keeps the extracted base stats in a JSON
/// file. Interrupted runs keep what they fetched; the next run continues.
#[derive(Parser, Debug)]
#[command(name = "dex-harvest")]
#[command(version)]
#[command(about = "An incremental base-stats harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the record file and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_ref())?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dex_harvest=info,warn"),
            1 => EnvFilter::new("dex_harvest=debug,info"),
            2 => EnvFilter::new("dex_harvest=trace,debug"),
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

/// Loads and validates the configuration, or falls back to defaults
fn load(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the --dry-run mode: validates config and shows what would be harvested
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Dex-Harvest Dry Run ===\n");

    println!("Harvester Configuration:");
    println!("  Batch size: {}", config.harvester.batch_size);
    println!("  Concurrency: {}", config.harvester.concurrency);
    println!("  Pause between batches: {:?}", config.pause());

    println!("\nSource:");
    println!("  Base URL: {}", config.source.base_url);
    println!("  List path: {}", config.source.list_path);

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());

    println!("\nFetch:");
    println!("  Request timeout: {}s", config.fetch.request_timeout_secs);
    println!("  Connect timeout: {}s", config.fetch.connect_timeout_secs);

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);

    let harvester = Harvester::new(config.clone())?;
    println!("\n✓ Configuration is valid");
    println!("✓ Would harvest entries listed at {}", harvester.list_url()?);

    Ok(())
}

/// Handles the --stats mode: shows statistics from the record file
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use dex_harvest::output::{load_statistics, print_statistics};

    println!("Records: {}\n", config.output.records_path);

    let store = JsonRecordStore::new(&config.output.records_path);
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting {}{} into {}",
        config.source.base_url,
        config.source.list_path,
        config.output.records_path
    );

    // Ctrl-C cancels the run; records of completed batches are still saved
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping");
            on_signal.cancel();
        }
    });

    match harvest(config, cancel).await {
        Ok(summary) if summary.is_complete() => {
            tracing::info!("Harvest completed: {}", summary);
            Ok(())
        }
        Ok(summary) => {
            tracing::warn!("Harvest stopped early: {}", summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
