use crate::config::types::{
    Config, CoordinatorConfig, CrawlerConfig, DownloadConfig, HttpConfig, OutputConfig,
    RetryConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Site URLs listed in `sites-file` are checked later, when the file is
/// read by [`Config::resolve_sites`].
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_retry_config(&config.retry)?;
    validate_download_config(&config.download)?;
    validate_coordinator_config(&config.coordinator)?;
    validate_output_config(&config.output)?;
    validate_sites(&config.sites)?;

    if config.sites.is_empty() && config.sites_file.is_none() {
        return Err(ConfigError::Validation(
            "either `sites` or `sites-file` must be provided".to_string(),
        ));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 || config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be between 1 and timeout_secs ({}), got {}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_retries > 20 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 20, got {}",
            config.max_retries
        )));
    }

    if config.max_backoff_ms < config.backoff_factor_ms {
        return Err(ConfigError::Validation(format!(
            "max_backoff_ms ({}) must be >= backoff_factor_ms ({})",
            config.max_backoff_ms, config.backoff_factor_ms
        )));
    }

    for &code in &config.retry_statuses {
        if !(100..=599).contains(&code) {
            return Err(ConfigError::Validation(format!(
                "retry status {} is not a valid HTTP status code",
                code
            )));
        }
        if (200..300).contains(&code) {
            return Err(ConfigError::Validation(format!(
                "retry status {} is a success code and cannot be retried",
                code
            )));
        }
    }

    Ok(())
}

fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.destination.trim().is_empty() {
        return Err(ConfigError::Validation(
            "destination cannot be empty".to_string(),
        ));
    }

    if config.max_concurrent_downloads < 1 || config.max_concurrent_downloads > 256 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_downloads must be between 1 and 256, got {}",
            config.max_concurrent_downloads
        )));
    }

    Ok(())
}

fn validate_coordinator_config(config: &CoordinatorConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_sites < 1 || config.max_concurrent_sites > 1024 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_sites must be between 1 and 1024, got {}",
            config.max_concurrent_sites
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_sites(sites: &[String]) -> Result<(), ConfigError> {
    for site in sites {
        let url = Url::parse(site)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site URL '{}': {}", site, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Site URL '{}' must use HTTP or HTTPS",
                site
            )));
        }
    }

    Ok(())
}
