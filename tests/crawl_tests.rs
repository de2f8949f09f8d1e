//! Integration tests for the crawler
//!
//! These tests stand up a wiremock server in place of the external
//! fetch/cache service and run full crawl cycles end-to-end, then inspect
//! the persisted frontier and statistics.

use std::path::Path;
use tempfile::TempDir;
use tidecrawl::config::{
    Config, CrawlerConfig, FetchConfig, PatternEntry, ScopeConfig, StorageConfig,
};
use tidecrawl::crawler::crawl;
use tidecrawl::frontier::Frontier;
use tidecrawl::stats::StatsStore;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a crawl config pointed at the mock fetch service
fn test_config(server: &MockServer, dir: &TempDir, seeds: Vec<String>) -> Config {
    let uri = url::Url::parse(&server.uri()).unwrap();
    Config {
        crawler: CrawlerConfig {
            threads_count: 3,
            report_interval: 1000,
            report_top_words: 10,
        },
        fetch: FetchConfig {
            cache_host: uri.host_str().unwrap().to_string(),
            cache_port: uri.port().unwrap(),
            user_agent: "TideCrawl-Test/1.0".to_string(),
            politeness_delay_ms: 1,
        },
        storage: StorageConfig {
            stats_path: dir.path().join("stats.db").to_string_lossy().into_owned(),
            frontier_path: dir
                .path()
                .join("frontier.db")
                .to_string_lossy()
                .into_owned(),
        },
        scope: ScopeConfig {
            allowed_domains: vec!["127.0.0.1".to_string()],
            allowed_prefixes: vec![],
            max_query_variants: 300,
        },
        patterns: vec![PatternEntry {
            regex: ".*".to_string(),
            cap: -1,
        }],
        seeds,
    }
}

/// Builds a successful page bundle for `url` with the given HTML body
fn page_bundle(url: &str, body: &str) -> serde_json::Value {
    serde_json::json!({
        "url": url,
        "status": 200,
        "response": {
            "status": 200,
            "headers": {"content-type": "text/html"},
            "redirects": [],
            "final_url": "",
            "body": body.as_bytes(),
        }
    })
}

/// Mounts a mock serving `bundle` for fetches of `url`
async fn mount_page(server: &MockServer, url: &str, bundle: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", url))
        .respond_with(ResponseTemplate::new(200).set_body_json(bundle))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_filters_and_statistics() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // The crawler normalizes the seed before fetching it
    let seed = format!("http://{}", server.address());
    let page1 = format!("{}/page1", seed);

    mount_page(
        &server,
        &seed,
        page_bundle(
            &seed,
            &format!(
                r#"<html><head><title>Index</title></head><body>
                <p>welcome to the crawl frontier</p>
                <a href="{}/page1">Page 1</a>
                <a href="{}/notes.pdf">Asset</a>
                <a href="https://evil.com/y">Off domain</a>
                </body></html>"#,
                seed, seed
            ),
        ),
    )
    .await;

    mount_page(
        &server,
        &page1,
        page_bundle(
            &page1,
            "<html><body><p>frontier frontier frontier</p></body></html>",
        ),
    )
    .await;

    let config = test_config(&server, &dir, vec![format!("{}/", seed)]);
    let stats_path = config.storage.stats_path.clone();
    let frontier_path = config.storage.frontier_path.clone();

    crawl(config, true).await.expect("crawl failed");

    // Both in-scope pages completed; the asset and off-domain links never
    // entered the frontier
    let frontier = Frontier::open(Path::new(&frontier_path), false, &[]).unwrap();
    let counts = frontier.counts();
    assert_eq!(counts.complete, 2);
    assert_eq!(counts.discovered, 0);
    assert_eq!(counts.in_flight, 0);

    let store = StatsStore::open(Path::new(&stats_path), false).unwrap();
    let state = store.state();

    assert_eq!(state.counters[&seed].download_count, 1);
    assert_eq!(state.counters[&seed].outlink_count, 3);
    assert_eq!(state.counters[&page1].download_count, 1);
    assert_eq!(state.counters[&page1].visit_count, 1);
    assert!(!state.counters.contains_key("https://evil.com/y"));

    // Both fetches came from the same origin (the key carries no port)
    assert_eq!(state.sub_domains["http://127.0.0.1"], 2);

    // "frontier" appeared on both pages
    assert_eq!(state.word_rank["frontier"], 4);

    // page1 has more visible tokens than the index page's link text
    assert!(state.longest_page.word_count >= 3);
}

#[tokio::test]
async fn test_fetch_errors_are_recoverable() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let seed = format!("http://{}", server.address());
    let dead = format!("{}/dead", seed);
    let alive = format!("{}/alive", seed);

    mount_page(
        &server,
        &seed,
        page_bundle(
            &seed,
            &format!(
                r#"<body><a href="{}/dead">dead</a><a href="{}/alive">alive</a></body>"#,
                seed, seed
            ),
        ),
    )
    .await;

    // The cache service itself fails for /dead
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", dead.as_str()))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    mount_page(
        &server,
        &alive,
        page_bundle(&alive, "<body><p>still here</p></body>"),
    )
    .await;

    let config = test_config(&server, &dir, vec![seed.clone()]);
    let stats_path = config.storage.stats_path.clone();
    let frontier_path = config.storage.frontier_path.clone();

    crawl(config, true).await.expect("crawl failed");

    // The failed URL is complete without a download; the crawl went on
    let frontier = Frontier::open(Path::new(&frontier_path), false, &[]).unwrap();
    assert_eq!(frontier.counts().complete, 3);

    let store = StatsStore::open(Path::new(&stats_path), false).unwrap();
    let state = store.state();
    assert!(state
        .counters
        .get(&dead)
        .map(|c| c.download_count == 0)
        .unwrap_or(true));
    assert_eq!(state.counters[&alive].download_count, 1);
}

#[tokio::test]
async fn test_error_bundle_yields_no_links() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let seed = format!("http://{}", server.address());

    // Service answers 200 but the bundle carries an error and no snapshot
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", seed.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": seed,
            "status": 598,
            "error": "cache miss",
        })))
        .mount(&server)
        .await;

    let config = test_config(&server, &dir, vec![seed.clone()]);
    let stats_path = config.storage.stats_path.clone();
    let frontier_path = config.storage.frontier_path.clone();

    crawl(config, true).await.expect("crawl failed");

    let frontier = Frontier::open(Path::new(&frontier_path), false, &[]).unwrap();
    assert_eq!(frontier.counts().complete, 1);

    // A contentless fetch records no statistics
    let store = StatsStore::open(Path::new(&stats_path), false).unwrap();
    assert!(store.state().counters.is_empty());
}

#[tokio::test]
async fn test_resume_after_completed_crawl_is_a_noop() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let seed = format!("http://{}", server.address());
    mount_page(
        &server,
        &seed,
        page_bundle(&seed, "<body><p>only page</p></body>"),
    )
    .await;

    let config = test_config(&server, &dir, vec![seed.clone()]);
    let stats_path = config.storage.stats_path.clone();

    crawl(config.clone(), true).await.expect("first crawl failed");

    let downloads_after_first = {
        let store = StatsStore::open(Path::new(&stats_path), false).unwrap();
        store.state().counters[&seed].download_count
    };
    assert_eq!(downloads_after_first, 1);

    // Resume: the seed is already complete, so nothing is fetched again
    crawl(config, false).await.expect("resume crawl failed");

    let store = StatsStore::open(Path::new(&stats_path), false).unwrap();
    assert_eq!(store.state().counters[&seed].download_count, 1);
}

#[tokio::test]
async fn test_query_variants_capped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let seed = format!("http://{}", server.address());

    // The index links to more query variants of /list than the cap allows
    let links: String = (0..4)
        .map(|i| format!(r#"<a href="{}/list?page={}">p{}</a>"#, seed, i, i))
        .collect();
    mount_page(
        &server,
        &seed,
        page_bundle(&seed, &format!("<body>{}</body>", links)),
    )
    .await;
    for i in 0..4 {
        let variant = format!("{}/list?page={}", seed, i);
        mount_page(&server, &variant, page_bundle(&variant, "<body>list</body>")).await;
    }

    let mut config = test_config(&server, &dir, vec![seed.clone()]);
    config.scope.max_query_variants = 2;
    let frontier_path = config.storage.frontier_path.clone();

    crawl(config, true).await.expect("crawl failed");

    // Seed plus exactly two accepted variants were fetched
    let frontier = Frontier::open(Path::new(&frontier_path), false, &[]).unwrap();
    assert_eq!(frontier.counts().complete, 3);
}
