use url::Url;

/// Extracts the lowercase hostname from a URL string
///
/// Returns None for URLs that fail to parse or carry no host.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(|h| h.to_lowercase())
}

/// Builds the sub-domain statistics key `scheme://host` for a URL
///
/// # Examples
///
/// ```
/// use tidecrawl::url::origin_key;
///
/// let key = origin_key("https://vision.ics.uci.edu/papers?id=3").unwrap();
/// assert_eq!(key, "https://vision.ics.uci.edu");
/// ```
pub fn origin_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(format!("{}://{}", parsed.scheme(), host))
}
