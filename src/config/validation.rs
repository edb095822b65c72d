use crate::config::types::{ApiConfig, Config, FilterConfig, HarvestConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_harvest_config(&config.harvest)?;
    validate_filter_config(&config.filter)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates API endpoint configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    for (name, value) in [("auth_url", &config.auth_url), ("base_url", &config.base_url)] {
        let url = Url::parse(value)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::InvalidUrl(format!(
                "{} must use http or https, got '{}'",
                name, value
            )));
        }
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates traversal configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.sources.is_empty() {
        return Err(ConfigError::Validation(
            "sources must name at least one subreddit".to_string(),
        ));
    }

    for source in &config.sources {
        validate_subreddit_name(source)?;
    }

    if config.post_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "post_limit must be >= 1, got {}",
            config.post_limit
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    Ok(())
}

/// Validates the blacklist
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    // An empty phrase is a substring of every comment and would drop everything
    if config.blacklist.iter().any(|phrase| phrase.is_empty()) {
        return Err(ConfigError::Validation(
            "blacklist phrases cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.extract_file.is_empty() || config.extract_file.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "extract_file must be a plain file name, got '{}'",
            config.extract_file
        )));
    }

    Ok(())
}

/// Validates a subreddit name: 1-21 characters, alphanumeric and underscores
fn validate_subreddit_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() || name.len() > 21 {
        return Err(ConfigError::Validation(format!(
            "Subreddit name must be 1-21 characters, got '{}'",
            name
        )));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::Validation(format!(
            "Subreddit '{}' contains invalid characters",
            name
        )));
    }

    Ok(())
}
