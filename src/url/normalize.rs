/// Normalizes an absolute URL string for frontier and statistics keys
///
/// # Normalization Steps
///
/// 1. Drop the fragment (everything after `#`)
/// 2. Drop any trailing slashes
///
/// Candidate URLs are already absolute by the time they reach this function
/// (the extractor resolves relative hrefs against the effective page URL),
/// so normalization is purely textual. Two URLs that differ only by fragment
/// or trailing slash collapse to the same key.
///
/// # Examples
///
/// ```
/// use tidecrawl::url::normalize;
///
/// assert_eq!(normalize("https://example.com/page/#top"), "https://example.com/page");
/// assert_eq!(normalize("https://example.com/"), "https://example.com");
/// ```
pub fn normalize(url: &str) -> String {
    strip_trailing_slash(strip_fragment(url)).to_string()
}

/// Removes the fragment portion of a URL
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(pos) => &url[..pos],
        None => url,
    }
}

/// Removes trailing slashes from a URL
pub fn strip_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

/// Removes the query string portion of a URL
///
/// Used by the query-count filter to group query variants under one base URL.
pub fn strip_query(url: &str) -> &str {
    match url.find('?') {
        Some(pos) => &url[..pos],
        None => url,
    }
}
