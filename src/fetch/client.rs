//! Fetch client for the external fetch/cache service
//!
//! All page downloads go through a single cache service endpoint. The client
//! serializes requests process-wide and observes the configured politeness
//! delay inside the same exclusive scope, so at most one fetch is in flight
//! at any time and successive fetches are spaced by at least the delay.

use crate::config::FetchConfig;
use crate::fetch::bundle::{PageResponse, RawBundle};
use crate::fetch::FetchError;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::Mutex;

/// Client for the fetch/cache service
pub struct FetchClient {
    http: Client,
    endpoint: String,
    user_agent: String,
    delay: Duration,
    /// Global politeness gate: held for the request round-trip plus the delay
    gate: Mutex<()>,
}

impl FetchClient {
    /// Builds a fetch client from the fetch configuration
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|source| FetchError::Client { source })?;

        Ok(Self {
            http,
            endpoint: format!("http://{}:{}/", config.cache_host, config.cache_port),
            user_agent: config.user_agent.clone(),
            delay: Duration::from_millis(config.politeness_delay_ms),
            gate: Mutex::new(()),
        })
    }

    /// Fetches one URL through the cache service
    ///
    /// Errors are recoverable from the crawl's point of view: the caller
    /// logs them, marks the URL complete, and moves on.
    pub async fn fetch(&self, url: &str) -> Result<PageResponse, FetchError> {
        let _guard = self.gate.lock().await;

        let result = self.request(url).await;

        // Delay inside the gate so the next fetch cannot start early
        tokio::time::sleep(self.delay).await;

        result
    }

    async fn request(&self, url: &str) -> Result<PageResponse, FetchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("q", url), ("u", self.user_agent.as_str())])
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let service_status = response.status();
        if !service_status.is_success() {
            return Err(FetchError::Service {
                url: url.to_string(),
                status: service_status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let raw: RawBundle =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
                url: url.to_string(),
                source,
            })?;

        let page = PageResponse::from_raw(raw);

        // The target server's own status lives in the snapshot; a non-success
        // code there fails the fetch even though the cache service answered
        if let Some(snapshot) = &page.snapshot {
            if snapshot.status >= 400 {
                return Err(FetchError::HttpStatus {
                    url: url.to_string(),
                    status: snapshot.status,
                });
            }
        }

        Ok(page)
    }
}
