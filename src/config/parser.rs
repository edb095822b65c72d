use crate::config::types::{Config, CredentialsConfig};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Reddit application credentials with every field present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use thread_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Post limit: {}", config.harvest.post_limit);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Loads the configuration file if it exists, otherwise returns the defaults
///
/// The defaults are still validated so a bad build-time default is caught
/// the same way a bad file would be.
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(
            "No configuration file at {}, using defaults",
            path.display()
        );
        let config = Config::default();
        validate(&config)?;
        Ok(config)
    }
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

impl CredentialsConfig {
    /// Fills missing fields from the process environment
    ///
    /// The binary loads a `.env` file into the environment before this runs.
    pub fn resolve(&self) -> Result<Credentials, ConfigError> {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Fills missing fields through `lookup`, keyed by environment variable name
    pub fn resolve_with<F>(&self, lookup: F) -> Result<Credentials, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |value: &Option<String>, key: &'static str| {
            value
                .clone()
                .or_else(|| lookup(key))
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingCredential(key))
        };

        Ok(Credentials {
            client_id: pick(&self.client_id, "CLIENT_ID")?,
            client_secret: pick(&self.client_secret, "CLIENT_SECRET")?,
            user_agent: pick(&self.user_agent, "USER_AGENT")?,
        })
    }
}
