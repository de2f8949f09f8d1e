//! Crawl controller
//!
//! Owns the lifecycle of the statistics store and the frontier, spawns the
//! worker pool, and joins on completion. The crawl's only termination signal
//! is frontier exhaustion: each worker stops when it observes the empty
//! sentinel, and the controller returns once every worker has stopped.

mod worker;

pub use worker::Worker;

use crate::config::Config;
use crate::fetch::FetchClient;
use crate::filters::Scope;
use crate::frontier::Frontier;
use crate::stats::StatsStore;
use crate::Result;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub struct Crawler {
    config: Config,
    frontier: Arc<Frontier>,
    stats: Arc<Mutex<StatsStore>>,
    client: Arc<FetchClient>,
    scope: Arc<Scope>,
}

impl Crawler {
    /// Initializes the crawl: compiles the scope, opens both stores, and
    /// seeds (or resumes) the frontier
    pub fn new(config: Config, fresh: bool) -> Result<Self> {
        let scope = Scope::from_config(&config.scope, &config.patterns)?;

        let stats = StatsStore::open(Path::new(&config.storage.stats_path), fresh)?;

        let frontier = Frontier::open(
            Path::new(&config.storage.frontier_path),
            fresh,
            &config.seeds,
        )?;

        let client = FetchClient::new(&config.fetch)?;

        Ok(Self {
            config,
            frontier: Arc::new(frontier),
            stats: Arc::new(Mutex::new(stats)),
            client: Arc::new(client),
            scope: Arc::new(scope),
        })
    }

    /// Spawns the worker pool and blocks until the frontier is exhausted
    /// and every worker has terminated
    pub async fn run(&self) -> Result<()> {
        let worker_count = self.config.crawler.threads_count;
        tracing::info!("Starting crawl with {} workers", worker_count);

        let mut handles = Vec::with_capacity(worker_count as usize);
        for id in 0..worker_count {
            let worker = Worker::new(
                id,
                Arc::clone(&self.frontier),
                Arc::clone(&self.stats),
                Arc::clone(&self.client),
                Arc::clone(&self.scope),
                self.config.crawler.report_interval,
                self.config.crawler.report_top_words,
            );
            handles.push(tokio::spawn(worker.run()));
        }

        for handle in handles {
            handle.await??;
        }

        // Final console report once the frontier is exhausted
        {
            let stats = self.stats.lock().unwrap();
            stats.report(self.config.crawler.report_top_words);
        }
        self.frontier.print_saved();

        tracing::info!("Crawl complete");
        Ok(())
    }

    /// Shared frontier handle (for diagnostics)
    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    /// Shared statistics handle (for diagnostics)
    pub fn stats(&self) -> &Arc<Mutex<StatsStore>> {
        &self.stats
    }
}

/// Runs a full crawl with the given configuration
pub async fn crawl(config: Config, fresh: bool) -> Result<()> {
    let crawler = Crawler::new(config, fresh)?;
    crawler.run().await
}
