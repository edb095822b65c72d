//! Thread-Harvest main entry point
//!
//! This is the command-line interface for the Thread-Harvest comment harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use thread_harvest::config::{load_config_or_default, Config};
use thread_harvest::harvester::harvest;
use thread_harvest::output::{extract_to_file, print_summary};
use tracing_subscriber::EnvFilter;

/// Thread-Harvest: a polite Reddit comment harvester
///
/// Harvests the comments of the newest posts of a list of subreddits,
/// filters out noise, and saves them as JSON. With --extract, turns a saved
/// harvest into plain text, one comment per line.
#[derive(Parser, Debug)]
#[command(name = "thread-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Program to scrape comments from subreddit posts", long_about = None)]
struct Cli {
    /// Scraped .json file to extract comments text from
    #[arg(short, long, value_name = "FILE")]
    extract: Option<PathBuf>,

    /// Path to TOML configuration file (defaults apply if it does not exist)
    #[arg(short, long, value_name = "CONFIG", default_value = "harvest.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without harvesting
    #[arg(long, conflicts_with = "extract")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Credentials may live in a .env file next to the binary
    dotenvy::dotenv().ok();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_config_or_default(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    if let Some(input) = cli.extract {
        handle_extract(&config, &input)
    } else if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else {
        handle_harvest(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("thread_harvest=info,warn"),
            1 => EnvFilter::new("thread_harvest=debug,info"),
            2 => EnvFilter::new("thread_harvest=trace,debug"),
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

/// Handles --extract: writes one line of text per persisted comment
fn handle_extract(config: &Config, input: &Path) -> anyhow::Result<()> {
    let output = extract_to_file(
        input,
        Path::new(&config.output.directory),
        &config.output.extract_file,
    )
    .with_context(|| format!("extraction of {} failed", input.display()))?;

    println!("✓ Comments extracted to: {}", output.display());
    Ok(())
}

/// Handles --dry-run: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Thread-Harvest Dry Run ===\n");

    println!("Harvest:");
    println!("  Posts per subreddit: {}", config.harvest.post_limit);
    println!("  Expansion depth: {}", config.harvest.expansion_depth);
    println!("  Rate limit: {}ms", config.harvest.rate_limit_ms);
    println!(
        "  Retries: {} (backoff {}ms)",
        config.harvest.max_retries, config.harvest.retry_backoff_ms
    );

    println!("\nAPI:");
    println!("  Auth: {}", config.api.auth_url);
    println!("  Base: {}", config.api.base_url);
    println!(
        "  Credentials: {}",
        if config.credentials.resolve().is_ok() {
            "found"
        } else {
            "missing"
        }
    );

    println!("\nOutput directory: {}", config.output.directory);

    println!("\nSubreddits ({}):", config.harvest.sources.len());
    for source in &config.harvest.sources {
        println!("  - r/{}", source);
    }

    println!("\nBlacklist ({}):", config.filter.blacklist.len());
    for phrase in &config.filter.blacklist {
        println!("  - {:?}", phrase);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Subreddits: {}, posts each: {}, expansion depth: {}",
        config.harvest.sources.len(),
        config.harvest.post_limit,
        config.harvest.expansion_depth
    );

    match harvest(config).await {
        Ok(report) => {
            print_summary(&report.metrics);
            println!("✓ Comments saved to: {}", report.output_path.display());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
