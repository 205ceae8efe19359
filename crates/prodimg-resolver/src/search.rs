//! Candidate discovery through a site-scoped web search.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use crate::client::extract_host;
use crate::error::ResolverError;
use crate::extract::extract_attr;

static ANCHOR_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>").expect("valid regex"));

/// Class that DuckDuckGo's HTML endpoint puts on organic result links.
const DDG_RESULT_CLASS: &str = "result__a";
/// Redirect parameter carrying the destination URL.
const DDG_REDIRECT_PARAM: &str = "uddg";

/// A search backend reachable over plain HTTP that returns an HTML results page.
pub trait SearchEngine: Send + Sync {
    /// Builds the results-page URL for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::InvalidSearchUrl`] if the configured endpoint
    /// cannot be parsed.
    fn search_url(&self, query: &str) -> Result<Url, ResolverError>;

    /// Extracts organic result URLs in ranking order. Redirect wrappers are
    /// unwrapped; malformed links are dropped.
    fn parse_results(&self, html: &str) -> Vec<String>;
}

/// DuckDuckGo's JavaScript-free results page.
#[derive(Debug, Clone)]
pub struct DuckDuckGoHtml {
    base_url: String,
}

impl DuckDuckGoHtml {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl SearchEngine for DuckDuckGoHtml {
    fn search_url(&self, query: &str) -> Result<Url, ResolverError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ResolverError::InvalidSearchUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    fn parse_results(&self, html: &str) -> Vec<String> {
        ANCHOR_TAG_RE
            .find_iter(html)
            .filter_map(|m| {
                let tag = m.as_str();
                let class = extract_attr(tag, "class")?;
                if !class.split_whitespace().any(|c| c == DDG_RESULT_CLASS) {
                    return None;
                }
                normalize_ddg_href(&extract_attr(tag, "href")?)
            })
            .collect()
    }
}

/// Resolves a raw result `href` to the destination URL.
fn normalize_ddg_href(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let candidate = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };

    let url = Url::parse(&candidate).ok()?;
    let is_redirect = url
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"))
        && url.path().starts_with("/l/");

    if is_redirect {
        let (_, target) = url
            .query_pairs()
            .find(|(k, v)| k == DDG_REDIRECT_PARAM && !v.trim().is_empty())?;
        let target = Url::parse(target.trim()).ok()?;
        return matches!(target.scheme(), "http" | "https").then(|| target.to_string());
    }

    matches!(url.scheme(), "http" | "https").then_some(candidate)
}

/// `site:{site} {term}`.
#[must_use]
pub fn site_query(site: &str, term: &str) -> String {
    format!("site:{site} {}", term.trim())
}

/// Keeps result URLs whose host contains `site`, in ranking order, without
/// duplicates, capped at `cap` entries.
#[must_use]
pub fn filter_candidates(urls: Vec<String>, site: &str, cap: usize) -> Vec<String> {
    let site = site.to_ascii_lowercase();
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|u| extract_host(u).is_some_and(|host| host.contains(&site)))
        .filter(|u| seen.insert(u.clone()))
        .take(cap)
        .collect()
}
