//! Page bundle decoding
//!
//! The fetch/cache service answers each request with a serialized page
//! bundle: the requested URL, the service-level status, an optional error
//! description, and an optional snapshot of the HTTP exchange the service
//! performed against the target server.

use serde::Deserialize;
use std::collections::HashMap;

/// Snapshot of the HTTP exchange performed by the fetch service
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSnapshot {
    /// HTTP status code returned by the target server
    pub status: u16,

    /// Response headers
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Redirect chain traversed before the final response (may be empty)
    #[serde(default)]
    pub redirects: Vec<String>,

    /// URL the final response came from
    #[serde(default)]
    pub final_url: String,

    /// Raw page body bytes
    #[serde(default)]
    pub body: Vec<u8>,
}

/// Raw wire form of a page bundle
///
/// The `response` field is kept as a loose value so a malformed snapshot
/// degrades to "no content" instead of failing the whole bundle.
#[derive(Debug, Deserialize)]
pub(crate) struct RawBundle {
    pub url: String,
    pub status: u16,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

/// A decoded fetch-service response for one URL
#[derive(Debug, Clone)]
pub struct PageResponse {
    /// The URL the fetch was issued for (trailing slash stripped)
    pub url: String,

    /// Service-level status for this fetch
    pub status: u16,

    /// Error description reported by the service, if any
    pub error: Option<String>,

    /// The HTTP exchange snapshot; None means the fetch carried no content
    pub snapshot: Option<HttpSnapshot>,
}

impl PageResponse {
    /// Builds a response from a decoded wire bundle
    pub(crate) fn from_raw(raw: RawBundle) -> Self {
        let snapshot = raw.response.and_then(|value| {
            match serde_json::from_value::<HttpSnapshot>(value) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    tracing::warn!("Undecodable HTTP snapshot for {}: {}", raw.url, e);
                    None
                }
            }
        });

        Self {
            url: crate::url::strip_trailing_slash(&raw.url).to_string(),
            status: raw.status,
            error: raw.error,
            snapshot,
        }
    }

    /// Whether the target server answered through at least one redirect
    pub fn is_redirected(&self) -> bool {
        self.snapshot
            .as_ref()
            .map(|s| !s.redirects.is_empty())
            .unwrap_or(false)
    }

    /// The URL link resolution should use as base: the post-redirect URL
    /// when the exchange was redirected, the requested URL otherwise
    pub fn effective_url(&self) -> &str {
        match &self.snapshot {
            Some(snapshot) if !snapshot.redirects.is_empty() && !snapshot.final_url.is_empty() => {
                &snapshot.final_url
            }
            _ => &self.url,
        }
    }

    /// The page body, when the fetch carried content
    pub fn body(&self) -> Option<&[u8]> {
        self.snapshot.as_ref().map(|s| s.body.as_slice())
    }
}
