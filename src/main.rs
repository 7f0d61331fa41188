//! Tagcrawl main entry point
//!
//! This is the command-line interface for the Tagcrawl frontier crawler.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tagcrawl::config::{load_config, Config};
use tagcrawl::crawler::open_crawler;
use tagcrawl::output::{load_statistics, print_statistics};
use tagcrawl::storage::open_store;
use tracing_subscriber::EnvFilter;

/// Tagcrawl: a persistent, tag-scoped web crawler
///
/// Seeds the given URLs under a tag, then crawls the shared frontier in
/// shallow-first order until no pending pages remain. Several processes may
/// run against the same database.
#[derive(Parser, Debug)]
#[command(name = "tagcrawl")]
#[command(version)]
#[command(about = "A persistent, tag-scoped web crawler", long_about = None)]
struct Cli {
    /// Tag applied to every seed URL of this invocation
    #[arg(short, long, default_value = "default")]
    tag: String,

    /// Seed URLs, queued at depth 0
    #[arg(value_name = "URLS")]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Exit once the frontier is empty instead of staying idle
    #[arg(long)]
    exit_when_drained: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["urls", "exit_when_drained"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load default configuration".to_string(),
    })?;
    tracing::debug!("Database: {}", config.store.database_path);

    if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config, &cli.tag, &cli.urls, cli.exit_when_drained).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tagcrawl=info,warn"),
            1 => EnvFilter::new("tagcrawl=debug,info"),
            2 => EnvFilter::new("tagcrawl=trace,debug"),
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

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.store.database_path);

    let store = open_store(Path::new(&config.store.database_path))
        .with_context(|| format!("Failed to open {}", config.store.database_path))?;
    let stats = load_statistics(&store)?;

    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    tag: &str,
    urls: &[String],
    exit_when_drained: bool,
) -> anyhow::Result<()> {
    let mut crawler = open_crawler(config)
        .with_context(|| format!("Failed to open frontier {}", config.store.database_path))?;

    if !urls.is_empty() {
        crawler.seed(tag, urls);
    }

    let summary = crawler.run().await;
    tracing::info!(
        "Fetched {} pages, {} failed, {} links queued, {} store errors",
        summary.pages_fetched,
        summary.pages_failed,
        summary.links_enqueued,
        summary.store_errors
    );

    if exit_when_drained {
        return Ok(());
    }

    // The frontier is drained; stay up until interrupted
    tracing::info!("Idle. Press Ctrl-C to exit");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Interrupted, exiting");

    Ok(())
}
