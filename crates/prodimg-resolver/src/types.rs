//! Request, trace, and outcome types for the resolution pipeline.

use std::fmt;

use serde::Serialize;

use crate::error::ResolverError;

/// One of the three matching algorithms, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Subcode,
    Ean,
    Name,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Subcode => write!(f, "subcode"),
            Strategy::Ean => write!(f, "ean"),
            Strategy::Name => write!(f, "name"),
        }
    }
}

/// A single resolution request. Build with [`ResolutionRequest::new`] so blank
/// identifiers are dropped and the site is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub site: String,
    pub subcode: Option<String>,
    pub ean: Option<String>,
    pub name: Option<String>,
    pub debug: bool,
}

impl ResolutionRequest {
    #[must_use]
    pub fn new(
        site: &str,
        subcode: Option<&str>,
        ean: Option<&str>,
        name: Option<&str>,
        debug: bool,
    ) -> Self {
        Self {
            site: normalize_site(site),
            subcode: non_blank(subcode),
            ean: non_blank(ean),
            name: non_blank(name),
            debug,
        }
    }

    /// # Errors
    ///
    /// Returns [`ResolverError::MissingIdentifier`] when subcode, ean and name
    /// are all absent.
    pub fn validate(&self) -> Result<(), ResolverError> {
        if self.subcode.is_none() && self.ean.is_none() && self.name.is_none() {
            return Err(ResolverError::MissingIdentifier);
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// `"https://www.Bringo.ma/"` → `"www.bringo.ma"`. Only scheme and trailing
/// slashes are stripped; the host is kept as a substring filter.
fn normalize_site(site: &str) -> String {
    let site = site.trim().to_ascii_lowercase();
    let host = site
        .strip_prefix("https://")
        .or_else(|| site.strip_prefix("http://"))
        .unwrap_or(&site);
    host.trim_end_matches('/').to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchedBy {
    #[serde(rename = "subcode/ean")]
    Token,
    #[serde(rename = "name")]
    Name,
}

/// Terminal value of a successful strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub image_url: String,
    pub product_url: String,
    pub matched_by: MatchedBy,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Accepted and an image was extracted.
    Matched,
    /// Page loaded but the subcode/EAN was not on it.
    NoToken,
    /// Accepted but no product image could be extracted.
    NoImage,
    BelowThreshold,
    FetchFailed,
}

/// One candidate examined by one strategy. Diagnostics only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub url: String,
    pub strategy: Strategy,
    pub http_ok: bool,
    pub outcome: AttemptOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttemptRecord {
    pub(crate) fn fetch_failed(url: &str, strategy: Strategy, reason: String) -> Self {
        Self {
            url: url.to_owned(),
            strategy,
            http_ok: false,
            outcome: AttemptOutcome::FetchFailed,
            matched: None,
            title: None,
            score: None,
            error: Some(reason),
        }
    }

    pub(crate) fn token(url: &str, strategy: Strategy, outcome: AttemptOutcome) -> Self {
        Self {
            url: url.to_owned(),
            strategy,
            http_ok: true,
            outcome,
            matched: Some(outcome != AttemptOutcome::NoToken),
            title: None,
            score: None,
            error: None,
        }
    }

    pub(crate) fn titled(url: &str, title: String, score: f64, outcome: AttemptOutcome) -> Self {
        Self {
            url: url.to_owned(),
            strategy: Strategy::Name,
            http_ok: true,
            outcome,
            matched: None,
            title: Some(title),
            score: Some(score),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Matched {
        result: MatchResult,
        tried: Vec<AttemptRecord>,
    },
    Exhausted {
        tried: Vec<AttemptRecord>,
    },
}

impl ResolutionOutcome {
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, ResolutionOutcome::Matched { .. })
    }

    #[must_use]
    pub fn tried(&self) -> &[AttemptRecord] {
        match self {
            ResolutionOutcome::Matched { tried, .. } | ResolutionOutcome::Exhausted { tried } => {
                tried
            }
        }
    }

    /// Shapes the outward JSON body. A match carries the trace only in debug
    /// mode; a miss always carries it.
    #[must_use]
    pub fn into_body(self, debug: bool) -> ResolutionBody {
        match self {
            ResolutionOutcome::Matched { result, tried } => ResolutionBody {
                image_url: Some(result.image_url),
                product_url: Some(result.product_url),
                matched_by: Some(result.matched_by),
                score: result.score,
                tried: debug.then_some(tried),
            },
            ResolutionOutcome::Exhausted { tried } => ResolutionBody {
                image_url: None,
                product_url: None,
                matched_by: None,
                score: 0.0,
                tried: Some(tried),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionBody {
    pub image_url: Option<String>,
    pub product_url: Option<String>,
    pub matched_by: Option<MatchedBy>,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<AttemptRecord>>,
}
