use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use tidecrawl::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Workers: {}", config.crawler.threads_count);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_TOML: &str = r#"
        seeds = ["https://www.ics.uci.edu"]

        [crawler]
        threads-count = 8

        [fetch]
        cache-host = "cache.example.com"
        cache-port = 9000
        user-agent = "TideCrawl/1.0"
        politeness-delay-ms = 500

        [storage]
        stats-path = "./stats.db"
        frontier-path = "./frontier.db"

        [scope]
        allowed-domains = ["ics.uci.edu", "cs.uci.edu"]
        allowed-prefixes = ["today.uci.edu/department/information_computer_sciences"]
        max-query-variants = 300

        [[pattern]]
        regex = "news/view_news(php)?"
        cap = 50

        [[pattern]]
        regex = ".*"
        cap = -1
    "#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_TOML);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.threads_count, 8);
        assert_eq!(config.fetch.cache_port, 9000);
        assert_eq!(config.scope.allowed_domains.len(), 2);
        assert_eq!(config.patterns.len(), 2);
        assert_eq!(config.patterns[0].cap, 50);
        assert_eq!(config.patterns[1].regex, ".*");
    }

    #[test]
    fn test_defaults_applied() {
        let file = create_temp_config(VALID_TOML);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.report_interval, 1000);
        assert_eq!(config.crawler.report_top_words, 50);
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let file = create_temp_config("this is not toml [[[");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_section_rejected() {
        let file = create_temp_config("[crawler]\nthreads-count = 4\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
