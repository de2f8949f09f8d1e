use crate::config::types::{Config, CrawlerConfig, FetchConfig, ScopeConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_storage_config(&config.storage)?;
    validate_scope_config(&config.scope)?;
    validate_patterns(config)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.threads_count < 1 || config.threads_count > 100 {
        return Err(ConfigError::Validation(format!(
            "threads-count must be between 1 and 100, got {}",
            config.threads_count
        )));
    }

    if config.report_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "report-interval must be >= 1, got {}",
            config.report_interval
        )));
    }

    Ok(())
}

/// Validates fetch/cache service configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.cache_host.is_empty() {
        return Err(ConfigError::Validation(
            "cache-host cannot be empty".to_string(),
        ));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates persistence paths
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.stats_path.is_empty() {
        return Err(ConfigError::Validation(
            "stats-path cannot be empty".to_string(),
        ));
    }

    if config.frontier_path.is_empty() {
        return Err(ConfigError::Validation(
            "frontier-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates scope configuration
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-domains cannot be empty".to_string(),
        ));
    }

    for domain in &config.allowed_domains {
        if domain.is_empty() || domain.contains('/') {
            return Err(ConfigError::Validation(format!(
                "allowed-domains entry '{}' must be a bare hostname suffix",
                domain
            )));
        }
    }

    for prefix in &config.allowed_prefixes {
        if !prefix.contains('/') {
            return Err(ConfigError::Validation(format!(
                "allowed-prefixes entry '{}' must contain a path component",
                prefix
            )));
        }
    }

    Ok(())
}

/// Validates pattern-count rules; the list must end with a catch-all so
/// every URL matches some rule at filter time
fn validate_patterns(config: &Config) -> Result<(), ConfigError> {
    for entry in &config.patterns {
        if entry.cap < -1 {
            return Err(ConfigError::Validation(format!(
                "pattern '{}' cap must be >= -1, got {}",
                entry.regex, entry.cap
            )));
        }
    }

    if let Some(last) = config.patterns.last() {
        if last.regex != ".*" {
            return Err(ConfigError::Validation(format!(
                "pattern list must end with the catch-all '.*', got '{}'",
                last.regex
            )));
        }
    }

    Ok(())
}

/// Validates seed URLs
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use an http or https scheme",
                seed
            )));
        }
    }

    Ok(())
}
