use serde::Deserialize;

/// Main configuration structure for tidecrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    pub storage: StorageConfig,
    pub scope: ScopeConfig,
    #[serde(default, rename = "pattern")]
    pub patterns: Vec<PatternEntry>,
    /// Seed URLs queued on a fresh crawl
    #[serde(default)]
    pub seeds: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent worker tasks
    #[serde(rename = "threads-count")]
    pub threads_count: u32,

    /// Console report every this many processed URLs per worker
    #[serde(rename = "report-interval", default = "default_report_interval")]
    pub report_interval: u64,

    /// Number of top-frequency words shown in each report
    #[serde(rename = "report-top-words", default = "default_report_top_words")]
    pub report_top_words: usize,
}

/// Fetch/cache service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Hostname of the fetch/cache service
    #[serde(rename = "cache-host")]
    pub cache_host: String,

    /// Port of the fetch/cache service
    #[serde(rename = "cache-port")]
    pub cache_port: u16,

    /// User-agent string forwarded with every fetch request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Minimum delay between successive fetches (milliseconds, global)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the statistics SQLite database
    #[serde(rename = "stats-path")]
    pub stats_path: String,

    /// Path to the frontier SQLite database
    #[serde(rename = "frontier-path")]
    pub frontier_path: String,
}

/// Crawl scope configuration consumed by the filter pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeConfig {
    /// Hostnames a candidate URL must match or be a subdomain of
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,

    /// host/path prefixes accepted even when the host is not allow-listed
    #[serde(rename = "allowed-prefixes", default)]
    pub allowed_prefixes: Vec<String>,

    /// Maximum distinct query-string variants fetched per base URL
    #[serde(rename = "max-query-variants", default = "default_max_query_variants")]
    pub max_query_variants: u64,
}

/// One pattern-count rule: URLs matching `regex` are accepted until the
/// pattern's global count exceeds `cap` (-1 = unlimited)
#[derive(Debug, Clone, Deserialize)]
pub struct PatternEntry {
    pub regex: String,
    pub cap: i64,
}

fn default_report_interval() -> u64 {
    1000
}

fn default_report_top_words() -> usize {
    50
}

fn default_max_query_variants() -> u64 {
    300
}
