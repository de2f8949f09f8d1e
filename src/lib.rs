//! Tidecrawl: a polite, domain-restricted web crawler
//!
//! This crate implements a crawl orchestration engine: a persistent URL
//! frontier with deduplication and at-most-once visitation, a pool of
//! concurrent workers, a fetch client that talks to an external fetch/cache
//! service under a global politeness delay, and a link filter pipeline backed
//! by a shared crawl-statistics store.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod filters;
pub mod frontier;
pub mod stats;
pub mod url;

use thiserror::Error;

/// Main error type for tidecrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Filter error: {0}")]
    Filter(#[from] filters::FilterError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Worker panicked: {0}")]
    Join(#[from] tokio::task::JoinError),

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

    #[error("Invalid regex pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Persistence errors for the frontier and the statistics store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL is not in flight: {0}")]
    NotInFlight(String),
}

/// Result type alias for tidecrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for persistence operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Crawler;
pub use frontier::Frontier;
pub use stats::StatsStore;
