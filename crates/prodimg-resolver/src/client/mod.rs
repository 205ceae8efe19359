//! Outbound HTTP for search result pages and candidate product pages.

mod origin;

use std::time::Duration;

use reqwest::Client;

use crate::error::ResolverError;

pub use origin::{extract_host, extract_origin};

/// Result of loading one candidate page. Failures are data, not errors: the
/// strategy records them and moves on to the next candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFetch {
    Loaded(String),
    Failed(String),
}

/// Thin wrapper over `reqwest::Client` with a fixed user agent and a hard
/// per-request timeout. No retries: a failed fetch eliminates that candidate.
#[derive(Debug, Clone)]
pub struct PageClient {
    client: Client,
}

impl PageClient {
    /// # Errors
    ///
    /// Returns [`ResolverError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ResolverError> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// GETs `url` and returns the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// - [`ResolverError::UnexpectedStatus`] — any non-2xx status.
    /// - [`ResolverError::Http`] — network, TLS, timeout, or body decode failure.
    pub async fn fetch_html(&self, url: &str) -> Result<String, ResolverError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "fr-FR,fr;q=0.9,en;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }

    /// Like [`Self::fetch_html`], with every failure folded into
    /// [`PageFetch::Failed`].
    pub async fn fetch_page(&self, url: &str) -> PageFetch {
        match self.fetch_html(url).await {
            Ok(body) => PageFetch::Loaded(body),
            Err(ResolverError::Http(e)) if e.is_timeout() => {
                tracing::debug!(url, "candidate fetch timed out");
                PageFetch::Failed("timed out".to_string())
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "candidate fetch failed");
                PageFetch::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
