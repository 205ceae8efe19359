//! URL origin and host helpers shared by the extractors and candidate filter.

/// Extracts the scheme+host origin from a page URL.
///
/// Given `"https://bringo.ma/p/123"`, returns `"https://bringo.ma"`. Returns
/// `None` for unparseable URLs and for opaque origins (`data:`, `file:`).
#[must_use]
pub fn extract_origin(page_url: &str) -> Option<String> {
    match reqwest::Url::parse(page_url) {
        Ok(u) => {
            let origin = u.origin();
            origin.is_tuple().then(|| origin.ascii_serialization())
        }
        Err(e) => {
            tracing::debug!(page_url, error = %e, "could not parse page URL for origin");
            None
        }
    }
}

/// Lowercased hostname of a URL, if it has one.
#[must_use]
pub fn extract_host(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}
