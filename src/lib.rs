//! Thread-Harvest: a polite Reddit comment harvester
//!
//! This crate walks a configured list of subreddits, resolves each post's
//! reply tree under a depth budget while respecting the API's rate ceiling,
//! flattens the tree into records, filters out noise, and persists the result.

pub mod config;
pub mod harvester;
pub mod output;
pub mod reddit;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Thread-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Source r/{source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Failed to expand replies of post {post_id}: {reason}")]
    Expansion { post_id: String, reason: String },

    #[error("Malformed input in {path}: {source}")]
    MalformedInput {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

/// Result type alias for Thread-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use harvester::{harvest, Harvest, HarvestReport};
pub use output::{FlatRecord, RunMetrics};
pub use reddit::{CommentNode, MoreStub, Post, RedditApi, RedditClient, Reply};
