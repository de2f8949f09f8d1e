//! SQLite-backed statistics store
//!
//! The store owns the in-memory [`CrawlState`] plus the database connection
//! that makes it durable. Workers share it behind a mutex; `sync` runs after
//! every successfully processed URL so a crash loses at most one in-flight
//! URL's updates.

use crate::stats::{CrawlState, LongestPage, UrlCounters};
use crate::StorageResult;
use rusqlite::{params, Connection};
use std::path::Path;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS url_counters (
    url TEXT PRIMARY KEY,
    outlink_count INTEGER NOT NULL DEFAULT 0,
    download_count INTEGER NOT NULL DEFAULT 0,
    query_count INTEGER NOT NULL DEFAULT 0,
    visit_count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS word_rank (
    word TEXT PRIMARY KEY,
    count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sub_domains (
    origin TEXT PRIMARY KEY,
    count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS pattern_counts (
    pattern TEXT PRIMARY KEY,
    count INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS longest_page (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    word_count INTEGER NOT NULL,
    urls_json TEXT NOT NULL
);
"#;

/// Persistent statistics store shared by all workers
pub struct StatsStore {
    conn: Connection,
    state: CrawlState,
}

impl StatsStore {
    /// Opens (or creates) the store at the given path
    ///
    /// With `fresh` set, any previously persisted statistics are discarded;
    /// otherwise the prior crawl's state is reloaded for resumption.
    pub fn open(path: &Path, fresh: bool) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.execute_batch(SCHEMA_SQL)?;

        if fresh {
            conn.execute_batch(
                "DELETE FROM url_counters;
                 DELETE FROM word_rank;
                 DELETE FROM sub_domains;
                 DELETE FROM pattern_counts;
                 DELETE FROM longest_page;",
            )?;
        }

        let state = load_state(&conn)?;

        Ok(Self { conn, state })
    }

    /// Creates an in-memory store (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        let state = load_state(&conn)?;
        Ok(Self { conn, state })
    }

    /// Shared read access to the crawl state
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Exclusive access to the crawl state
    ///
    /// Callers already hold the store's mutex, so every mutation through this
    /// reference is a single atomic read-modify-write.
    pub fn state_mut(&mut self) -> &mut CrawlState {
        &mut self.state
    }

    /// Persists the entire in-memory state in one transaction
    ///
    /// A full rewrite keeps the logic simple and makes compaction-induced
    /// deletions automatic; the tables stay small relative to a crawl.
    pub fn sync(&mut self) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute_batch(
            "DELETE FROM url_counters;
             DELETE FROM word_rank;
             DELETE FROM sub_domains;
             DELETE FROM pattern_counts;
             DELETE FROM longest_page;",
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO url_counters
                 (url, outlink_count, download_count, query_count, visit_count)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (url, c) in &self.state.counters {
                stmt.execute(params![
                    url,
                    c.outlink_count,
                    c.download_count,
                    c.query_count,
                    c.visit_count
                ])?;
            }

            let mut stmt = tx.prepare("INSERT INTO word_rank (word, count) VALUES (?1, ?2)")?;
            for (word, count) in &self.state.word_rank {
                stmt.execute(params![word, count])?;
            }

            let mut stmt =
                tx.prepare("INSERT INTO sub_domains (origin, count) VALUES (?1, ?2)")?;
            for (origin, count) in &self.state.sub_domains {
                stmt.execute(params![origin, count])?;
            }

            let mut stmt =
                tx.prepare("INSERT INTO pattern_counts (pattern, count) VALUES (?1, ?2)")?;
            for (pattern, count) in &self.state.pattern_counts {
                stmt.execute(params![pattern, count])?;
            }

            let urls_json = serde_json::to_string(&self.state.longest_page.urls)?;
            tx.execute(
                "INSERT INTO longest_page (id, word_count, urls_json) VALUES (1, ?1, ?2)",
                params![self.state.longest_page.word_count, urls_json],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Prints the periodic console report: longest page, top words, and
    /// per-origin page counts
    pub fn report(&self, top_words: usize) {
        println!(
            "Longest page: {} tokens on {:?}",
            self.state.longest_page.word_count, self.state.longest_page.urls
        );

        println!("Top {} words:", top_words);
        for (word, count) in self.state.top_words(top_words) {
            println!("  {:<24} {}", word, count);
        }

        let mut origins: Vec<(&String, &u64)> = self.state.sub_domains.iter().collect();
        origins.sort_by(|a, b| a.0.cmp(b.0));
        println!("Sub-domains ({}):", origins.len());
        for (origin, count) in origins {
            println!("  {} {}", origin, count);
        }
    }
}

/// Loads the persisted crawl state from the database
fn load_state(conn: &Connection) -> StorageResult<CrawlState> {
    let mut state = CrawlState::default();

    let mut stmt = conn.prepare(
        "SELECT url, outlink_count, download_count, query_count, visit_count FROM url_counters",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            UrlCounters {
                outlink_count: row.get(1)?,
                download_count: row.get(2)?,
                query_count: row.get(3)?,
                visit_count: row.get(4)?,
            },
        ))
    })?;
    for row in rows {
        let (url, counters) = row?;
        state.counters.insert(url, counters);
    }

    let mut stmt = conn.prepare("SELECT word, count FROM word_rank")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
    })?;
    for row in rows {
        let (word, count) = row?;
        state.word_rank.insert(word, count);
    }

    let mut stmt = conn.prepare("SELECT origin, count FROM sub_domains")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
    })?;
    for row in rows {
        let (origin, count) = row?;
        state.sub_domains.insert(origin, count);
    }

    let mut stmt = conn.prepare("SELECT pattern, count FROM pattern_counts")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
    })?;
    for row in rows {
        let (pattern, count) = row?;
        state.pattern_counts.insert(pattern, count);
    }

    let longest = conn
        .query_row(
            "SELECT word_count, urls_json FROM longest_page WHERE id = 1",
            [],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, String>(1)?)),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    if let Some((word_count, urls_json)) = longest {
        state.longest_page = LongestPage {
            word_count,
            urls: serde_json::from_str(&urls_json)?,
        };
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_fresh_store_has_default_state() {
        let store = StatsStore::open_in_memory().unwrap();
        assert!(store.state().counters.is_empty());
        assert_eq!(store.state().longest_page.word_count, 0);
    }

    #[test]
    fn test_sync_and_reload_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.db");

        {
            let mut store = StatsStore::open(&path, true).unwrap();
            let freqs = HashMap::from([("research".to_string(), 7u64)]);
            store
                .state_mut()
                .record_page("https://a.example.com/page", 4, 250, &freqs);
            store
                .state_mut()
                .pattern_counts
                .insert(".*".to_string(), 12);
            store.sync().unwrap();
        }

        let store = StatsStore::open(&path, false).unwrap();
        let state = store.state();
        assert_eq!(
            state.counters["https://a.example.com/page"].download_count,
            1
        );
        assert_eq!(state.word_rank["research"], 7);
        assert_eq!(state.sub_domains["https://a.example.com"], 1);
        assert_eq!(state.pattern_counts[".*"], 12);
        assert_eq!(state.longest_page.word_count, 250);
        assert_eq!(state.longest_page.urls, vec!["https://a.example.com/page"]);
    }

    #[test]
    fn test_fresh_open_discards_previous_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.db");

        {
            let mut store = StatsStore::open(&path, true).unwrap();
            store
                .state_mut()
                .record_page("https://example.com/x", 1, 10, &HashMap::new());
            store.sync().unwrap();
        }

        let store = StatsStore::open(&path, true).unwrap();
        assert!(store.state().counters.is_empty());
    }

    #[test]
    fn test_sync_reflects_compaction_deletes() {
        let mut store = StatsStore::open_in_memory().unwrap();
        store
            .state_mut()
            .word_rank
            .insert("stale".to_string(), 1);
        store.sync().unwrap();

        store.state_mut().word_rank.remove("stale");
        store.sync().unwrap();

        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM word_rank", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
