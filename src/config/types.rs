use serde::Deserialize;

/// Main configuration structure for Thread-Harvest
///
/// Every section is optional; a missing section or key falls back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub credentials: CredentialsConfig,
    pub api: ApiConfig,
    pub harvest: HarvestConfig,
    pub filter: FilterConfig,
    pub output: OutputConfig,
}

/// Reddit application credentials
///
/// Any field left out of the file is read from the environment
/// (`CLIENT_ID`, `CLIENT_SECRET`, `USER_AGENT`) when the client is built.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    #[serde(rename = "client-id")]
    pub client_id: Option<String>,

    #[serde(rename = "client-secret")]
    pub client_secret: Option<String>,

    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

/// Endpoints of the upstream API
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Host that issues OAuth tokens
    #[serde(rename = "auth-url")]
    pub auth_url: String,

    /// Host that serves authenticated API calls
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            auth_url: "https://www.reddit.com".to_string(),
            base_url: "https://oauth.reddit.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Traversal behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Subreddits to harvest, in traversal order
    pub sources: Vec<String>,

    /// Maximum number of most-recent posts to take from each source
    #[serde(rename = "post-limit")]
    pub post_limit: u32,

    /// Maximum number of stub-expansion rounds per post
    #[serde(rename = "expansion-depth")]
    pub expansion_depth: u32,

    /// Minimum time between expansion calls (milliseconds, 0 disables)
    #[serde(rename = "rate-limit-ms")]
    pub rate_limit_ms: u64,

    /// Retries for a transient expansion failure before the run aborts
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base delay of the exponential retry backoff (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            sources: [
                "wallstreetbets",
                "smallstreetbets",
                "StockMarket",
                "Shortsqueeze",
                "investing",
                "Daytrading",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            post_limit: 15,
            expansion_depth: 15,
            rate_limit_ms: 1000,
            max_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}

/// Content exclusion policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Comments whose raw text contains any of these phrases are dropped
    pub blacklist: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            blacklist: [
                "[deleted]",
                "[removed]",
                "I am a bot",
                "https://preview.redd.it/",
                "![gif](giphy",
                "**User Report**",
                "I will be messaging you in",
                "[**Join WSB Discord**]",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that receives harvest and extraction files
    pub directory: String,

    /// File name written by extraction mode
    #[serde(rename = "extract-file")]
    pub extract_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "out".to_string(),
            extract_file: "extracted.txt".to_string(),
        }
    }
}
