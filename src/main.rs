//! Sharescrape main entry point
//!
//! Command-line interface for the continuous share-chat thread importer.

use clap::Parser;
use sharescrape::config::{load_config, validate, Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sharescrape: continuous share-chat thread importer
///
/// Scrapes a paginated share-chat thread page by page and imports every post
/// exactly once into the local content store, then keeps polling for new
/// posts until terminated.
#[derive(Parser, Debug)]
#[command(name = "sharescrape")]
#[command(version)]
#[command(about = "Continuous share-chat thread importer", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply without one)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seconds to sleep between passes
    #[arg(long, value_name = "SECONDS")]
    delay: Option<u64>,

    /// Target thread identifier
    #[arg(long, value_name = "ID")]
    thread: Option<i64>,

    /// Pages scanned per pass
    #[arg(long, value_name = "COUNT")]
    pages: Option<u32>,

    /// Keep scanning past pages that yield nothing new
    #[arg(long)]
    ignore_duplicates: bool,

    /// Purge previously imported posts for the thread before the first pass
    #[arg(long)]
    purge: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration, print effective settings, and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);

    // Flag overrides can invalidate a config that loaded fine
    validate(&config)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
        return Ok(());
    }

    tracing::info!(
        "Importing ticker {} into thread {} ({} pages per pass, {}s delay)",
        config.source.ticker,
        config.import.thread_id,
        config.import.max_pages,
        config.import.delay_seconds
    );

    sharescrape::import::run(config).await?;
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sharescrape=info,warn"),
            1 => EnvFilter::new("sharescrape=debug,info"),
            2 => EnvFilter::new("sharescrape=trace,debug"),
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

/// Applies CLI flag overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(delay) = cli.delay {
        config.import.delay_seconds = delay;
    }
    if let Some(thread) = cli.thread {
        config.import.thread_id = thread;
    }
    if let Some(pages) = cli.pages {
        config.import.max_pages = pages;
    }
    if cli.ignore_duplicates {
        config.import.ignore_duplicates = true;
    }
    if cli.purge {
        config.import.delete_posts_before_import = true;
    }
}

/// Handles --dry-run: validates config and shows the effective settings
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Sharescrape Dry Run ===\n");

    println!("Import:");
    println!("  Thread id: {}", config.import.thread_id);
    println!("  Pages per pass: {}", config.import.max_pages);
    println!("  Delay between passes: {}s", config.import.delay_seconds);
    println!("  Ignore duplicates: {}", config.import.ignore_duplicates);
    println!(
        "  Purge before import: {}",
        config.import.delete_posts_before_import
    );

    println!("\nSource:");
    println!("  Ticker: {}", config.source.ticker);
    println!("  First page URL: {}", config.source.page_url(1)?);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);
    println!("  Purge batch size: {}", config.storage.purge_batch_size);

    println!("\nConfiguration is valid.");
    Ok(())
}
