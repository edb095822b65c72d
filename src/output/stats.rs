//! Run metrics
//!
//! This module provides the counters accumulated during one harvest run
//! and the end-of-run report.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Counters of one harvest run
///
/// Created at run start and finalized with [`RunMetrics::finish`].
#[derive(Debug, Clone)]
pub struct RunMetrics {
    /// Number of subreddits visited
    pub sources_visited: u64,

    /// Number of posts visited
    pub posts_visited: u64,

    /// Number of records that reached the exclusion test
    pub comments_scraped: u64,

    /// Number of records that survived filtering
    pub comments_kept: u64,

    /// Wall-clock time the run started (names the output file)
    pub started_at: DateTime<Utc>,

    started: Instant,
    finished: Option<Duration>,
}

impl RunMetrics {
    /// Starts a new run with all counters at zero
    pub fn start() -> Self {
        Self {
            sources_visited: 0,
            posts_visited: 0,
            comments_scraped: 0,
            comments_kept: 0,
            started_at: Utc::now(),
            started: Instant::now(),
            finished: None,
        }
    }

    pub fn source_visited(&mut self) {
        self.sources_visited += 1;
    }

    pub fn post_visited(&mut self) {
        self.posts_visited += 1;
    }

    pub fn comment_scraped(&mut self) {
        self.comments_scraped += 1;
    }

    pub fn comment_kept(&mut self) {
        self.comments_kept += 1;
    }

    /// Freezes the elapsed time
    pub fn finish(&mut self) {
        if self.finished.is_none() {
            self.finished = Some(self.started.elapsed());
        }
    }

    /// Time from run start to now, or to [`RunMetrics::finish`] once called
    pub fn elapsed(&self) -> Duration {
        self.finished.unwrap_or_else(|| self.started.elapsed())
    }

    /// Share of scraped comments that were kept, as a percentage
    pub fn keep_rate(&self) -> f64 {
        if self.comments_scraped == 0 {
            return 0.0;
        }
        (self.comments_kept as f64 / self.comments_scraped as f64) * 100.0
    }
}

/// Prints the end-of-run report to stdout
pub fn print_summary(metrics: &RunMetrics) {
    println!(">> Finished");
    println!(">> Subreddits scraped: {}", metrics.sources_visited);
    println!(">> Posts scraped:      {}", metrics.posts_visited);
    println!(">> Comments scraped:   {}", metrics.comments_scraped);
    println!(
        ">> Comments kept:      {} ({:.1}%)",
        metrics.comments_kept,
        metrics.keep_rate()
    );
    println!(
        ">> Time taken:         {:.2} sec",
        metrics.elapsed().as_secs_f64()
    );
}
