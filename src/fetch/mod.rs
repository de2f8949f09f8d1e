//! Fetch module: the client for the external fetch/cache service and the
//! page bundle it answers with.

mod bundle;
mod client;

pub use bundle::{HttpSnapshot, PageResponse};
pub use client::FetchClient;

use thiserror::Error;

/// Errors signalled by the fetch client
///
/// Every variant is recoverable: the worker logs it, marks the URL complete
/// without extracting links, and continues the crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {source}")]
    Client { source: reqwest::Error },

    #[error("Fetch service unreachable for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Fetch service returned status {status} for {url}")]
    Service { url: String, status: u16 },

    #[error("Undecodable page bundle for {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    #[error("Target server returned status {status} for {url}")]
    HttpStatus { url: String, status: u16 },
}
