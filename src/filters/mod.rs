//! Filter pipeline deciding which discovered URLs re-enter the frontier
//!
//! An ordered conjunction of independent predicates: a candidate URL is in
//! scope only if it passes every stage, and a stage-k rejection short-circuits
//! the rest. The counter-based stages (query-count, pattern-count,
//! visit-count) mutate the crawl state as a side effect of evaluation, so a
//! whole extraction batch is filtered under one statistics-store lock.

use crate::config::{PatternEntry, ScopeConfig};
use crate::stats::CrawlState;
use crate::url::{host_of, strip_fragment, strip_query};
use crate::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/// File extensions rejected by the asset filter (path only, query and
/// fragment ignored)
const ASSET_EXTENSIONS: &[&str] = &[
    "7z", "arff", "avi", "bin", "bmp", "bz2", "cnf", "css", "csv", "dat", "data", "dll", "dmg",
    "doc", "docx", "eps", "epub", "exe", "gif", "gz", "ico", "iso", "jar", "jpeg", "jpg", "js",
    "m4v", "mid", "mkv", "mov", "mp2", "mp3", "mp4", "mpeg", "msi", "mso", "names", "ogg", "ogv",
    "pdf", "png", "ppt", "pptx", "ps", "psd", "ram", "rar", "rm", "rtf", "sha1", "smil", "swf",
    "tar", "tex", "tgz", "thmx", "tif", "tiff", "wav", "wma", "wmv", "xls", "xlsx", "zip",
];

/// Filter pipeline errors
#[derive(Debug, Error)]
pub enum FilterError {
    /// The pattern rule list failed to cover a URL; the configured list must
    /// end with a catch-all
    #[error("No pattern rule matches URL: {0}")]
    NoPatternMatch(String),
}

/// One compiled pattern-count rule
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// The pattern string as written in the config (statistics key)
    pub raw: String,
    /// Compiled regex, matched unanchored against the full URL
    pub regex: Regex,
    /// Acceptance cap; -1 means unlimited
    pub cap: i64,
}

/// Compiled crawl scope shared read-only by all workers
#[derive(Debug, Clone)]
pub struct Scope {
    allowed_domains: Vec<String>,
    allowed_prefixes: Vec<String>,
    max_query_variants: u64,
    patterns: Vec<PatternRule>,
}

impl Scope {
    /// Compiles the scope configuration and pattern rules
    ///
    /// An empty pattern list compiles to a single unlimited catch-all.
    pub fn from_config(
        scope: &ScopeConfig,
        patterns: &[PatternEntry],
    ) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(patterns.len().max(1));
        for entry in patterns {
            let regex =
                Regex::new(&entry.regex).map_err(|source| ConfigError::InvalidPattern {
                    pattern: entry.regex.clone(),
                    source,
                })?;
            compiled.push(PatternRule {
                raw: entry.regex.clone(),
                regex,
                cap: entry.cap,
            });
        }
        if compiled.is_empty() {
            let regex = Regex::new(".*").map_err(|source| ConfigError::InvalidPattern {
                pattern: ".*".to_string(),
                source,
            })?;
            compiled.push(PatternRule {
                raw: ".*".to_string(),
                regex,
                cap: -1,
            });
        }

        Ok(Self {
            allowed_domains: scope
                .allowed_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            allowed_prefixes: scope.allowed_prefixes.clone(),
            max_query_variants: scope.max_query_variants,
            patterns: compiled,
        })
    }

    /// Runs the whole pipeline over one extraction batch
    ///
    /// The caller holds the statistics-store lock for the duration, making a
    /// single page's filtering atomic with respect to other workers.
    pub fn filter(
        &self,
        urls: &HashSet<String>,
        state: &mut CrawlState,
    ) -> Result<HashSet<String>, FilterError> {
        let mut accepted = HashSet::new();
        for url in urls {
            if self.is_in_scope(url, state)? {
                accepted.insert(url.clone());
            }
        }
        Ok(accepted)
    }

    /// Evaluates the stages for one URL, in order, fail-fast
    pub fn is_in_scope(&self, url: &str, state: &mut CrawlState) -> Result<bool, FilterError> {
        if !has_web_scheme(url) {
            return Ok(false);
        }
        if !self.in_allowed_domains(url) {
            return Ok(false);
        }
        if is_asset(url) {
            return Ok(false);
        }
        if !query_budget(url, self.max_query_variants, state) {
            return Ok(false);
        }
        if !pattern_budget(url, &self.patterns, state)? {
            return Ok(false);
        }
        Ok(first_visit(url, state))
    }

    /// Stage 2: hostname suffix-matches an allowed domain, or the URL's
    /// host+path starts with an allowed prefix
    fn in_allowed_domains(&self, url: &str) -> bool {
        let Some(host) = host_of(url) else {
            return false;
        };

        if self
            .allowed_domains
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
        {
            return true;
        }

        if let Ok(parsed) = Url::parse(url) {
            let host_and_path = format!("{}{}", host, parsed.path());
            if self
                .allowed_prefixes
                .iter()
                .any(|p| host_and_path.starts_with(p))
            {
                return true;
            }
        }

        false
    }
}

/// Stage 1: only http and https URLs are crawlable
fn has_web_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Stage 3: rejects URLs whose path ends in a binary/document/media extension
fn is_asset(url: &str) -> bool {
    let path = strip_fragment(strip_query(url));
    let Some(segment) = path.rsplit('/').next() else {
        return false;
    };
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            ASSET_EXTENSIONS.binary_search(&ext.to_lowercase().as_str()).is_ok()
        }
        _ => false,
    }
}

/// Stage 4: caps how many query-string variants of one base URL are accepted
///
/// Applied to every URL: acceptance charges the base URL's query budget even
/// when the URL carries no query string.
fn query_budget(url: &str, limit: u64, state: &mut CrawlState) -> bool {
    let base = strip_query(url).to_string();
    let counters = state.counters_mut(&base);
    if counters.query_count < limit {
        counters.query_count += 1;
        true
    } else {
        false
    }
}

/// Stage 5: first matching pattern rule decides; the match is counted
/// regardless of the accept/reject outcome
fn pattern_budget(
    url: &str,
    rules: &[PatternRule],
    state: &mut CrawlState,
) -> Result<bool, FilterError> {
    for rule in rules {
        if rule.regex.is_match(url) {
            let count = state.pattern_counts.entry(rule.raw.clone()).or_insert(0);
            *count += 1;
            return Ok(rule.cap == -1 || *count <= rule.cap as u64);
        }
    }
    Err(FilterError::NoPatternMatch(url.to_string()))
}

/// Stage 6: each exact URL is accepted once; the first acceptance is recorded
fn first_visit(url: &str, state: &mut CrawlState) -> bool {
    let counters = state.counters_mut(url);
    if counters.visit_count < 1 {
        counters.visit_count += 1;
        true
    } else {
        false
    }
}
