//! Harvester module for comment traversal and processing
//!
//! This module contains the core harvesting logic, including:
//! - Rate limiting of upstream calls
//! - Comment tree expansion under a depth budget
//! - Flattening reply forests into records
//! - Content filtering and sanitization
//! - Overall harvest coordination

mod coordinator;
mod expander;
mod filter;
mod flatten;
mod limiter;


pub use coordinator::{Harvest, HarvestOutcome};
pub use expander::{expand_forest, Expansion, ExpansionPolicy, ResolvedComment};
pub use filter::{sanitize, ContentFilter};
pub use flatten::flatten;
pub use limiter::{FixedIntervalLimiter, RateLimiter};

use crate::config::Config;
use crate::output::{output_file_name, write_records, RunMetrics};
use crate::reddit::{RedditApi, RedditClient};
use crate::HarvestError;
use std::path::{Path, PathBuf};

/// Where a completed run wrote its records, and what it counted
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub output_path: PathBuf,
    pub metrics: RunMetrics,
}

/// Runs a complete harvest operation
///
/// This is the main entry point for a harvest. It will:
/// 1. Resolve credentials and authenticate with Reddit
/// 2. Walk every configured source and post
/// 3. Write the kept records to the output directory
///
/// Nothing is written unless every source was harvested.
///
/// # Arguments
///
/// * `config` - The harvest configuration
///
/// # Returns
///
/// * `Ok(HarvestReport)` - Harvest completed and its records were written
/// * `Err(HarvestError)` - Harvest failed
///
/// # Example
///
/// ```no_run
/// use thread_harvest::config::load_config;
/// use thread_harvest::harvester::harvest;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = harvest(&config).await?;
/// println!("Wrote {}", report.output_path.display());
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: &Config) -> Result<HarvestReport, HarvestError> {
    harvest_with_env(config, |key| std::env::var(key).ok()).await
}

/// Runs a complete harvest, filling missing credentials through `lookup`
///
/// Missing credentials fail with [`HarvestError::Authentication`] before any
/// network call is made.
pub async fn harvest_with_env<F>(
    config: &Config,
    lookup: F,
) -> Result<HarvestReport, HarvestError>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = config
        .credentials
        .resolve_with(lookup)
        .map_err(|e| HarvestError::Authentication(e.to_string()))?;
    let client = RedditClient::connect(&config.api, &credentials).await?;

    run_harvest(client, config).await
}

/// Runs a harvest against an already connected API and writes the records
pub async fn run_harvest<A>(api: A, config: &Config) -> Result<HarvestReport, HarvestError>
where
    A: RedditApi,
{
    let limiter = FixedIntervalLimiter::from_millis(config.harvest.rate_limit_ms);
    tracing::debug!("Upstream calls spaced {:?} apart", limiter.interval());
    let filter = ContentFilter::from_config(&config.filter);
    let mut harvest = Harvest::new(api, limiter, config.harvest.clone(), filter);

    let outcome = harvest.run().await?;

    let output_path = write_records(
        &outcome.records,
        Path::new(&config.output.directory),
        &output_file_name(outcome.metrics.started_at),
    )?;

    Ok(HarvestReport {
        output_path,
        metrics: outcome.metrics,
    })
}
