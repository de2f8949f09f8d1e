//! Worker loop: pull, fetch, extract, filter, push, mark complete
//!
//! Each worker runs independently until the frontier hands out the empty
//! sentinel. Fetch and extraction failures are recoverable (the URL is still
//! marked complete); persistence failures are not and stop the worker.

use crate::extract::{self, ExtractedPage};
use crate::fetch::FetchClient;
use crate::filters::Scope;
use crate::frontier::Frontier;
use crate::stats::StatsStore;
use crate::Result;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

pub struct Worker {
    id: u32,
    frontier: Arc<Frontier>,
    stats: Arc<Mutex<StatsStore>>,
    client: Arc<FetchClient>,
    scope: Arc<Scope>,
    report_interval: u64,
    report_top_words: usize,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        frontier: Arc<Frontier>,
        stats: Arc<Mutex<StatsStore>>,
        client: Arc<FetchClient>,
        scope: Arc<Scope>,
        report_interval: u64,
        report_top_words: usize,
    ) -> Self {
        Self {
            id,
            frontier,
            stats,
            client,
            scope,
            report_interval,
            report_top_words,
        }
    }

    /// Runs the worker until the frontier is exhausted
    pub async fn run(self) -> Result<()> {
        let mut processed: u64 = 0;

        loop {
            let Some(url) = self.frontier.get_tbd_url()? else {
                tracing::info!("Worker {}: frontier is empty, stopping", self.id);
                break;
            };

            match self.client.fetch(&url).await {
                Ok(response) => {
                    tracing::info!(
                        "Worker {}: downloaded {}, status <{}>",
                        self.id,
                        url,
                        response.status
                    );

                    if let Some(page) = extract::extract(&response) {
                        let accepted = self.digest_page(&url, &page)?;
                        for link in accepted {
                            self.frontier.add_url(&link)?;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Worker {}: fetch failed for {}: {}", self.id, url, e);
                }
            }

            self.frontier.mark_url_complete(&url)?;

            processed += 1;
            if processed % self.report_interval == 0 {
                let stats = self.stats.lock().unwrap();
                stats.report(self.report_top_words);
                drop(stats);
                self.frontier.print_saved();
            }
        }

        Ok(())
    }

    /// Records one page's statistics and filters its links, all under a
    /// single statistics-store scope, then syncs the store to disk
    fn digest_page(&self, url: &str, page: &ExtractedPage) -> Result<HashSet<String>> {
        let mut stats = self.stats.lock().unwrap();

        stats.state_mut().record_page(
            url,
            page.links.len() as u64,
            page.token_count,
            &page.word_freqs,
        );

        let accepted = match self.scope.filter(&page.links, stats.state_mut()) {
            Ok(accepted) => accepted,
            Err(e) => {
                // Configuration bug (missing catch-all pattern): surface it
                // loudly and drop this page's links rather than crash or
                // silently misaccount
                tracing::error!("Filter pipeline failed on links from {}: {}", url, e);
                HashSet::new()
            }
        };

        stats.sync()?;
        Ok(accepted)
    }
}
