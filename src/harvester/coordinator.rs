//! Harvest coordinator - main traversal logic
//!
//! This module contains the sequential harvest loop that coordinates:
//! - Walking the configured sources in order
//! - Fetching each source's most recent posts
//! - Loading and expanding each post's reply forest
//! - Flattening and filtering the replies into records
//! - Counting run metrics

use crate::config::HarvestConfig;
use crate::harvester::expander::{call_with_retry, expand_forest, ExpansionPolicy};
use crate::harvester::filter::ContentFilter;
use crate::harvester::flatten::flatten;
use crate::harvester::limiter::RateLimiter;
use crate::output::{FlatRecord, RunMetrics};
use crate::reddit::{ApiError, Post, RedditApi};
use crate::HarvestError;

/// Records and metrics of a completed run
#[derive(Debug, Clone)]
pub struct HarvestOutcome {
    pub records: Vec<FlatRecord>,
    pub metrics: RunMetrics,
}

/// Main harvest structure
///
/// Owns the upstream API, the rate limiter and the run's settings. A run
/// visits one source at a time and one post at a time; any fatal error
/// aborts the whole run.
pub struct Harvest<A, L> {
    api: A,
    limiter: L,
    config: HarvestConfig,
    policy: ExpansionPolicy,
    filter: ContentFilter,
}

impl<A, L> Harvest<A, L>
where
    A: RedditApi,
    L: RateLimiter,
{
    /// Creates a new harvest
    ///
    /// # Arguments
    ///
    /// * `api` - The upstream API
    /// * `limiter` - Throttle awaited before every upstream call
    /// * `config` - Sources, limits and retry settings
    /// * `filter` - Content filter applied to every flattened post
    pub fn new(api: A, limiter: L, config: HarvestConfig, filter: ContentFilter) -> Self {
        let policy = ExpansionPolicy::from_config(&config);
        Self {
            api,
            limiter,
            config,
            policy,
            filter,
        }
    }

    /// Returns the upstream API
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns the rate limiter
    pub fn limiter(&self) -> &L {
        &self.limiter
    }

    /// Runs the harvest over every configured source
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestOutcome)` - Every source was harvested
    /// * `Err(HarvestError::SourceUnavailable)` - A source could not be listed
    /// * `Err(HarvestError::Expansion)` - A reply forest could not be loaded or expanded
    pub async fn run(&mut self) -> Result<HarvestOutcome, HarvestError> {
        let mut metrics = RunMetrics::start();
        let mut records = Vec::new();
        let sources = self.config.sources.clone();

        tracing::info!("Starting harvest of {} sources", sources.len());

        for source in &sources {
            metrics.source_visited();
            tracing::info!("[Subreddit] {}", source);

            let posts = self.list_posts(source).await?;
            tracing::debug!("r/{}: {} posts listed", source, posts.len());

            for post in &posts {
                metrics.post_visited();
                let kept = self.harvest_post(post, &mut metrics).await?;
                records.extend(kept);
            }
        }

        metrics.finish();
        tracing::info!(
            "Harvest completed: {} of {} comments kept in {:?}",
            metrics.comments_kept,
            metrics.comments_scraped,
            metrics.elapsed()
        );

        Ok(HarvestOutcome { records, metrics })
    }

    /// Lists the most recent posts of one source
    async fn list_posts(&mut self, source: &str) -> Result<Vec<Post>, HarvestError> {
        self.limiter.throttle().await;

        self.api
            .list_recent_posts(source, self.config.post_limit)
            .await
            .map_err(|e| match e {
                ApiError::Auth(message) => HarvestError::Authentication(message),
                e => HarvestError::SourceUnavailable {
                    source_name: source.to_string(),
                    reason: e.to_string(),
                },
            })
    }

    /// Loads, expands, flattens and filters the replies of one post
    async fn harvest_post(
        &mut self,
        post: &Post,
        metrics: &mut RunMetrics,
    ) -> Result<Vec<FlatRecord>, HarvestError> {
        tracing::info!("[Post] {}", post.title);

        let api = &self.api;
        let forest = call_with_retry(&mut self.limiter, &self.policy, post, move || {
            api.load_replies(post)
        })
        .await?;

        let expansion =
            expand_forest(&self.api, &mut self.limiter, post, &forest, &self.policy).await?;
        tracing::debug!(
            "Post {}: {} expansion calls, {} stubs truncated",
            post.id,
            expansion.calls,
            expansion.truncated
        );

        let flat = flatten(&expansion.forest, post.created_at);
        Ok(self.filter.apply(flat, metrics))
    }
}
