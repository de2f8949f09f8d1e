//! Link extraction and page-text statistics
//!
//! Given a fetched page, this module resolves every outbound hyperlink to a
//! normalized absolute URL and computes the visible-text token statistics the
//! filter pipeline and the statistics store consume.

mod stopwords;
mod text;

pub use stopwords::STOP_WORDS;
pub use text::{tokenize, visible_text, word_frequencies};

use crate::fetch::PageResponse;
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet};
use url::Url;

/// Everything extracted from one fetched page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// Deduplicated outbound links, normalized (absolute, fragment-free,
    /// trailing-slash-free)
    pub links: HashSet<String>,

    /// Number of visible-text tokens on the page (stop words included)
    pub token_count: u64,

    /// Visible-text word frequencies (stop words excluded)
    pub word_freqs: HashMap<String, u64>,
}

/// Extracts links and text statistics from a fetch response
///
/// Returns None when the fetch carried no content. Relative hrefs resolve
/// against the effective (post-redirect) URL. A base URL that fails to parse
/// degrades to an empty link set rather than aborting the page.
pub fn extract(response: &PageResponse) -> Option<ExtractedPage> {
    let body = response.body()?;
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);

    let links = match Url::parse(response.effective_url()) {
        Ok(base) => extract_links(&document, &base),
        Err(e) => {
            tracing::warn!(
                "Unparseable base URL {}: {}; dropping links",
                response.effective_url(),
                e
            );
            HashSet::new()
        }
    };

    let tokens = text::tokenize(&text::visible_text(&document));
    let word_freqs = text::word_frequencies(&tokens);

    Some(ExtractedPage {
        links,
        token_count: tokens.len() as u64,
        word_freqs,
    })
}

/// Extracts all hyperlinks from the document, resolved and normalized
fn extract_links(document: &Html, base: &Url) -> HashSet<String> {
    let mut links = HashSet::new();

    if let Ok(selector) = Selector::parse("a[href], area[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(resolved) = resolve_link(href, base) {
                    links.insert(resolved);
                }
            }
        }
    }

    links
}

/// Resolves one href against the base URL and normalizes it
///
/// Returns None for hrefs that are not crawlable page references:
/// javascript:/mailto:/tel: pseudo-links, data URIs, fragment-only anchors,
/// and hrefs that fail to resolve.
fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base.join(href).ok()?;
    Some(crate::url::normalize(absolute.as_str()))
}
