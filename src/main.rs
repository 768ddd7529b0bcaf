//! PDF-Harvest main entry point
//!
//! This is the command-line interface for the PDF-Harvest site crawler.

use anyhow::Context;
use clap::Parser;
use pdf_harvest::config::{compute_config_hash, parse_config, validate, Config};
use pdf_harvest::crawler::run_harvest;
use pdf_harvest::output::{load_statistics, print_statistics};
use pdf_harvest::storage::SqliteStore;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// PDF-Harvest: a polite PDF site crawler
///
/// PDF-Harvest crawls each configured website within its own origin,
/// collects every link that points at a PDF and downloads those files
/// concurrently, recording where each one came from.
#[derive(Parser, Debug)]
#[command(name = "pdf-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite PDF site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Read site entry URLs from this file (one per line) instead of the config
    #[arg(long, value_name = "FILE")]
    sites_file: Option<PathBuf>,

    /// Download PDFs into this folder instead of the configured one
    #[arg(long, value_name = "DIR")]
    destination: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the latest run from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_with_overrides(&cli).map_err(|e| {
        tracing::error!("Failed to load configuration: {:#}", e);
        e
    })?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pdf_harvest=info,warn"),
            1 => EnvFilter::new("pdf_harvest=debug,info"),
            2 => EnvFilter::new("pdf_harvest=trace,debug"),
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

/// Loads the configuration, applies command-line overrides, then validates
fn load_with_overrides(cli: &Cli) -> anyhow::Result<(Config, String)> {
    let content = std::fs::read_to_string(&cli.config)
        .with_context(|| format!("cannot read {}", cli.config.display()))?;
    let mut config = parse_config(&content)?;

    if let Some(sites_file) = &cli.sites_file {
        config.sites.clear();
        config.sites_file = Some(sites_file.display().to_string());
    }
    if let Some(destination) = &cli.destination {
        config.download.destination = destination.display().to_string();
    }

    validate(&config)?;
    let hash = compute_config_hash(&cli.config)?;

    Ok((config, hash))
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let sites = config.resolve_sites()?;

    println!("=== PDF-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Traversal: {:?}", config.crawler.traversal);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!("  Max pages per site: {}", config.crawler.max_pages);
    println!(
        "  Max concurrent sites: {}",
        config.coordinator.max_concurrent_sites
    );
    println!(
        "  Max concurrent downloads per site: {}",
        config.download.max_concurrent_downloads
    );

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!(
        "  Retries: {} (statuses {:?})",
        config.retry.max_retries, config.retry.retry_statuses
    );

    println!("\nOutput:");
    println!("  Downloads: {}", config.download.destination);
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\nSites ({}):", sites.len());
    for site in &sites {
        println!("  - {} (origin {})", site.entry_url(), site.origin());
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start harvesting {} sites", sites.len());

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, config_hash: String) -> anyhow::Result<()> {
    let sites = config.resolve_sites()?;
    tracing::info!(
        "Harvesting {} sites into {}",
        sites.len(),
        config.download.destination
    );

    match run_harvest(config, sites, config_hash).await {
        Ok(report) => {
            tracing::info!(
                "Harvest completed: {} PDFs downloaded, {} failed, {} sites failed",
                report.stats.downloads_succeeded,
                report.stats.downloads_failed,
                report.stats.sites_failed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
