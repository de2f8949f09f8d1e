//! The URL frontier: a persistent FIFO queue with deduplication,
//! at-most-once handout, and crash-recoverable completion tracking.
//!
//! Every URL the crawl has ever seen is in exactly one of three durable
//! states: `discovered` (queued), `in_flight` (handed to a worker), or
//! `complete` (fetched, or permanently rejected). Deduplication is on the
//! normalized URL, so a URL can never be queued twice regardless of which
//! state it reached before.

use crate::{StorageError, StorageResult};
use rusqlite::{params, Connection};
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Mutex;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS frontier_urls (
    url TEXT PRIMARY KEY,
    state TEXT NOT NULL CHECK (state IN ('discovered', 'in_flight', 'complete'))
);

CREATE INDEX IF NOT EXISTS idx_frontier_state ON frontier_urls(state);
"#;

/// Snapshot of the frontier's size per state, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierCounts {
    pub discovered: usize,
    pub in_flight: usize,
    pub complete: usize,
}

struct FrontierInner {
    conn: Connection,
    /// FIFO queue of discovered URLs, in discovery order
    queue: VecDeque<String>,
    /// Every URL ever added, in any state
    seen: HashSet<String>,
    /// URLs handed to a worker and not yet marked complete
    in_flight: HashSet<String>,
    complete_count: usize,
}

/// Shared, persistent URL frontier
///
/// All operations take the frontier's single lock, so no two concurrent
/// `get_tbd_url` calls can return the same URL.
pub struct Frontier {
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    /// Opens the frontier at the given path
    ///
    /// With `fresh` set, prior state is discarded and the seeds are queued.
    /// Otherwise the prior crawl is resumed: completed URLs stay completed,
    /// and any URL left `discovered` or `in_flight` at crash time is
    /// re-queued so it is not permanently lost. Seeds the frontier has never
    /// seen are queued in both modes.
    pub fn open(path: &Path, fresh: bool, seeds: &[String]) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;

        if fresh {
            conn.execute("DELETE FROM frontier_urls", [])?;
        }

        let mut inner = FrontierInner {
            conn,
            queue: VecDeque::new(),
            seen: HashSet::new(),
            in_flight: HashSet::new(),
            complete_count: 0,
        };
        inner.load()?;

        let frontier = Self {
            inner: Mutex::new(inner),
        };
        for seed in seeds {
            frontier.add_url(&crate::url::normalize(seed))?;
        }
        Ok(frontier)
    }

    /// Creates an in-memory frontier (for testing)
    #[cfg(test)]
    pub fn open_in_memory(seeds: &[String]) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        let frontier = Self {
            inner: Mutex::new(FrontierInner {
                conn,
                queue: VecDeque::new(),
                seen: HashSet::new(),
                in_flight: HashSet::new(),
                complete_count: 0,
            }),
        };
        for seed in seeds {
            frontier.add_url(&crate::url::normalize(seed))?;
        }
        Ok(frontier)
    }

    /// Returns the next URL to fetch, or None when no URL is waiting
    ///
    /// None is the crawl's terminal sentinel: the call never blocks waiting
    /// for new work, and once no URL is discovered or in flight nothing can
    /// ever arrive again. The returned URL transitions to `in_flight`
    /// durably before the lock is released.
    pub fn get_tbd_url(&self) -> StorageResult<Option<String>> {
        let mut inner = self.inner.lock().unwrap();

        let Some(url) = inner.queue.pop_front() else {
            return Ok(None);
        };

        inner.conn.execute(
            "UPDATE frontier_urls SET state = 'in_flight' WHERE url = ?1",
            params![url],
        )?;
        inner.in_flight.insert(url.clone());
        Ok(Some(url))
    }

    /// Enqueues a normalized URL if and only if it has never been seen
    /// before, in any state; duplicate adds are silent no-ops
    pub fn add_url(&self, url: &str) -> StorageResult<()> {
        let mut inner = self.inner.lock().unwrap();

        if inner.seen.contains(url) {
            return Ok(());
        }

        inner.conn.execute(
            "INSERT INTO frontier_urls (url, state) VALUES (?1, 'discovered')",
            params![url],
        )?;
        inner.seen.insert(url.to_string());
        inner.queue.push_back(url.to_string());
        Ok(())
    }

    /// Transitions a URL from in-flight to complete, durably
    ///
    /// After this call returns, a crash will never cause the URL to be
    /// re-fetched. Calling it for a URL that is not in flight is an error.
    pub fn mark_url_complete(&self, url: &str) -> StorageResult<()> {
        let mut inner = self.inner.lock().unwrap();

        if !inner.in_flight.remove(url) {
            return Err(StorageError::NotInFlight(url.to_string()));
        }

        inner.conn.execute(
            "UPDATE frontier_urls SET state = 'complete' WHERE url = ?1",
            params![url],
        )?;
        inner.complete_count += 1;
        Ok(())
    }

    /// Current per-state sizes
    pub fn counts(&self) -> FrontierCounts {
        let inner = self.inner.lock().unwrap();
        FrontierCounts {
            discovered: inner.queue.len(),
            in_flight: inner.in_flight.len(),
            complete: inner.complete_count,
        }
    }

    /// Diagnostic dump of the frontier sizes; no side effects on crawl state
    pub fn print_saved(&self) {
        let counts = self.counts();
        println!(
            "Frontier: {} discovered, {} in flight, {} complete",
            counts.discovered, counts.in_flight, counts.complete
        );
    }
}

impl FrontierInner {
    /// Loads persisted state, re-queueing unresolved URLs
    ///
    /// URLs that were in flight when the process died go back to
    /// `discovered`: their fetch never completed, so re-fetching them is the
    /// only way not to lose them.
    fn load(&mut self) -> StorageResult<()> {
        self.conn.execute(
            "UPDATE frontier_urls SET state = 'discovered' WHERE state = 'in_flight'",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT url, state FROM frontier_urls ORDER BY rowid")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (url, state) = row?;
            match state.as_str() {
                "discovered" => self.queue.push_back(url.clone()),
                _ => self.complete_count += 1,
            }
            self.seen.insert(url);
        }

        Ok(())
    }
}
