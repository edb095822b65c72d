//! Reddit access layer
//!
//! This module defines the domain model of a discussion thread and the
//! [`RedditApi`] capability the harvester is written against:
//! - listing the most recent posts of a subreddit
//! - loading the initial (possibly stub-laden) reply forest of a post
//! - expanding one "more replies" stub into its real subtree
//!
//! [`RedditClient`] implements the capability over Reddit's OAuth API.

mod client;
mod wire;

pub use client::RedditClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by an upstream API call
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ApiError {
    /// Returns true for faults that may succeed when retried
    ///
    /// Timeouts, connection failures, HTTP 429 and HTTP 5xx are transient.
    /// Everything else (auth, 4xx, undecodable bodies) is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Auth(_) | Self::Decode { .. } => false,
        }
    }
}

/// Result type for upstream API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// One top-level discussion item
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Base-36 post id (without the `t3_` prefix)
    pub id: String,

    pub title: String,

    /// Creation time of the post; every comment under it inherits this
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Reddit fullname of this post (`t3_<id>`)
    pub fn fullname(&self) -> String {
        format!("t3_{}", self.id)
    }
}

/// One entry of a reply forest
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A loaded comment
    Comment(CommentNode),

    /// A placeholder for replies that were not loaded
    More(MoreStub),
}

/// A loaded comment and its loaded replies
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub id: String,
    pub score: i64,
    pub body: String,
    pub replies: Vec<Reply>,
}

/// Placeholder for an unexpanded subtree
///
/// A stub with no child ids is a "continue this thread" marker: its replies
/// are reached by reloading the subtree rooted at `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoreStub {
    /// Number of hidden replies
    pub count: u32,

    /// Fullname of the comment (`t1_`) or post (`t3_`) the replies hang off
    pub parent_id: String,

    /// Ids of the hidden direct and indirect replies
    pub children: Vec<String>,
}

impl MoreStub {
    /// Returns true if this stub marks a thread continuation
    pub fn is_continuation(&self) -> bool {
        self.children.is_empty()
    }
}

/// The upstream capability the harvester depends on
///
/// All methods are one external call each, so callers throttle before
/// every invocation.
#[async_trait]
pub trait RedditApi: Send + Sync {
    /// Lists up to `limit` most recent posts of `source`, newest first
    async fn list_recent_posts(&self, source: &str, limit: u32) -> ApiResult<Vec<Post>>;

    /// Loads the initial reply forest of `post`, sorted by top score
    async fn load_replies(&self, post: &Post) -> ApiResult<Vec<Reply>>;

    /// Resolves `stub` into the subtree it stands for
    async fn expand_replies(&self, post: &Post, stub: &MoreStub) -> ApiResult<Vec<Reply>>;
}
