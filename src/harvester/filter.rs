//! Content filtering of flat records
//!
//! Two stages, in this order:
//! 1. Exclusion: a record whose raw text contains any blacklist phrase is dropped
//! 2. Sanitization: survivors get newlines turned into spaces, whitespace runs
//!    collapsed, and the ends trimmed
//!
//! Exclusion never sees sanitized text, so a phrase split across a line
//! break is not caught.

use crate::config::FilterConfig;
use crate::output::{FlatRecord, RunMetrics};

/// Blacklist-based record filter
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    blacklist: Vec<String>,
}

impl ContentFilter {
    /// Creates a filter excluding records that contain any of `blacklist`
    pub fn new(blacklist: Vec<String>) -> Self {
        Self { blacklist }
    }

    /// Creates a filter from the `[filter]` config section
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(config.blacklist.clone())
    }

    /// Returns true if `text` contains any blacklist phrase (case-sensitive)
    pub fn is_excluded(&self, text: &str) -> bool {
        self.blacklist
            .iter()
            .any(|phrase| text.contains(phrase.as_str()))
    }

    /// Applies both stages, counting scraped and kept records on `metrics`
    pub fn apply(&self, records: Vec<FlatRecord>, metrics: &mut RunMetrics) -> Vec<FlatRecord> {
        let mut kept = Vec::with_capacity(records.len());

        for mut record in records {
            metrics.comment_scraped();
            if self.is_excluded(&record.text) {
                tracing::trace!("Excluded comment {}", record.id);
                continue;
            }
            record.text = sanitize(&record.text);
            metrics.comment_kept();
            kept.push(record);
        }

        kept
    }
}

/// Replaces newlines with spaces, collapses whitespace runs, trims the ends
pub fn sanitize(text: &str) -> String {
    text.replace('\n', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
