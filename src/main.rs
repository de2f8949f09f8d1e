//! Tidecrawl main entry point
//!
//! Command-line interface for the tidecrawl web crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tidecrawl::config::load_config;
use tidecrawl::crawler::crawl;
use tidecrawl::stats::StatsStore;
use tracing_subscriber::EnvFilter;

/// Tidecrawl: a polite, domain-restricted web crawler
///
/// Tidecrawl downloads pages through an external fetch/cache service under a
/// global politeness delay, keeps its frontier and statistics on disk, and
/// can resume an interrupted crawl where it left off.
#[derive(Parser, Debug)]
#[command(name = "tidecrawl")]
#[command(version = "1.0.0")]
#[command(about = "A polite, domain-restricted web crawler", long_about = None)]
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

    /// Resume an interrupted crawl (default behavior)
    #[arg(long, conflicts_with = "fresh")]
    resume: bool,

    /// Start a fresh crawl, discarding previous frontier and statistics
    #[arg(long, conflicts_with = "resume")]
    fresh: bool,

    /// Print the persisted crawl report and exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tidecrawl=info,warn"),
            1 => EnvFilter::new("tidecrawl=debug,info"),
            2 => EnvFilter::new("tidecrawl=trace,debug"),
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

/// Handles the --stats mode: prints the persisted report and exits
fn handle_stats(config: &tidecrawl::config::Config) -> anyhow::Result<()> {
    use std::path::Path;

    println!("Statistics database: {}\n", config.storage.stats_path);

    let store = StatsStore::open(Path::new(&config.storage.stats_path), false)
        .context("Failed to open statistics store")?;
    store.report(config.crawler.report_top_words);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: tidecrawl::config::Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (discarding previous state)");
    } else {
        tracing::info!("Starting crawl (will resume if interrupted run exists)");
    }

    tracing::info!(
        "Workers: {}, politeness delay: {}ms, cache service: {}:{}",
        config.crawler.threads_count,
        config.fetch.politeness_delay_ms,
        config.fetch.cache_host,
        config.fetch.cache_port
    );

    crawl(config, fresh).await.context("Crawl failed")?;

    tracing::info!("Crawl completed successfully");
    Ok(())
}
