//! Crawl statistics: per-URL counters, word-frequency table, longest-page
//! record, sub-domain counts, and pattern-match counts.
//!
//! All of this state is shared by every worker and mutated only while the
//! owning [`StatsStore`]'s lock is held; each logical update is a single
//! read-modify-write inside that scope.

mod store;

pub use store::StatsStore;

use std::collections::HashMap;

/// Word-frequency table compaction thresholds: when the table grows past
/// `WORD_RANK_LIMIT` entries it is pruned to the `WORD_RANK_KEEP` entries
/// with the highest counts (lossy, an accepted approximation).
pub const WORD_RANK_LIMIT: usize = 5000;
pub const WORD_RANK_KEEP: usize = 3000;

/// Counters tracked per normalized URL
///
/// Created lazily on first reference, never deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlCounters {
    /// Outbound links observed on this page
    pub outlink_count: u64,
    /// Times this URL was fetched
    pub download_count: u64,
    /// Times a query-string variant of this base URL passed the query filter
    pub query_count: u64,
    /// Times this exact URL passed the visit-count filter
    pub visit_count: u64,
}

/// The maximum visible-token count seen on any page and the URLs achieving it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongestPage {
    pub word_count: u64,
    pub urls: Vec<String>,
}

impl Default for LongestPage {
    fn default() -> Self {
        Self {
            word_count: 0,
            urls: vec![String::new()],
        }
    }
}

/// All shared mutable crawl statistics
#[derive(Debug, Clone, Default)]
pub struct CrawlState {
    pub counters: HashMap<String, UrlCounters>,
    pub word_rank: HashMap<String, u64>,
    pub longest_page: LongestPage,
    pub sub_domains: HashMap<String, u64>,
    pub pattern_counts: HashMap<String, u64>,
}

impl CrawlState {
    /// Gets the counters for a URL, creating them on first reference
    pub fn counters_mut(&mut self, url: &str) -> &mut UrlCounters {
        self.counters.entry(url.to_string()).or_default()
    }

    /// Records the page-level statistics of one successfully fetched URL
    pub fn record_page(
        &mut self,
        url: &str,
        outlink_count: u64,
        token_count: u64,
        word_freqs: &HashMap<String, u64>,
    ) {
        let counters = self.counters_mut(url);
        counters.outlink_count += outlink_count;
        counters.download_count += 1;

        for (word, freq) in word_freqs {
            *self.word_rank.entry(word.clone()).or_insert(0) += freq;
        }
        self.compact_word_rank();

        self.record_longest(url, token_count);

        if let Some(origin) = crate::url::origin_key(url) {
            *self.sub_domains.entry(origin).or_insert(0) += 1;
        }
    }

    /// Updates the longest-page record: a strictly larger count replaces the
    /// URL list, an equal count appends to it
    fn record_longest(&mut self, url: &str, token_count: u64) {
        if token_count > self.longest_page.word_count {
            self.longest_page.word_count = token_count;
            self.longest_page.urls = vec![url.to_string()];
        } else if token_count == self.longest_page.word_count {
            self.longest_page.urls.push(url.to_string());
        }
    }

    /// Prunes the word table once it exceeds the size limit, keeping the
    /// highest-frequency entries
    fn compact_word_rank(&mut self) {
        if self.word_rank.len() <= WORD_RANK_LIMIT {
            return;
        }

        let mut entries: Vec<(String, u64)> = self.word_rank.drain().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(WORD_RANK_KEEP);
        self.word_rank = entries.into_iter().collect();
    }

    /// The `top` highest-frequency words, descending
    pub fn top_words(&self, top: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .word_rank
            .iter()
            .map(|(w, c)| (w.clone(), *c))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(top);
        entries
    }
}
