use crate::config::types::{ApiConfig, Config, CrawlerConfig, PollConfig};
use crate::ConfigError;
use url::Url;

/// Largest page count the backend accepts for a single crawl
const MAX_CRAWL_PAGES: u32 = 50;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_crawler_config(&config.crawler)?;
    validate_poll_config(&config.poll)?;
    Ok(())
}

/// Validates backend connection configuration
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    validate_base_url(&config.base_url)?;

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Parses and checks a backend base URL
///
/// Only `http` and `https` URLs with a host are accepted.
pub fn validate_base_url(base_url: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", base_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            base_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            base_url
        )));
    }

    Ok(url)
}

/// Validates crawl job parameters
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 || config.max_pages > MAX_CRAWL_PAGES {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and {}, got {}",
            MAX_CRAWL_PAGES, config.max_pages
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1s, got {}s",
            config.timeout
        )));
    }

    Ok(())
}

/// Validates polling bounds
fn validate_poll_config(config: &PollConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}
