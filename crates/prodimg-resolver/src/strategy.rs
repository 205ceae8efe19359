//! The three matching strategies. Each walks the ranked candidate list
//! sequentially and stops at the first accepted page that yields an image.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::client::PageFetch;
use crate::dispatcher::Resolver;
use crate::normalize::{clean_name, tokenize};
use crate::search::{filter_candidates, site_query};
use crate::similarity::overlap_score;
use crate::types::{
    AttemptOutcome, AttemptRecord, MatchResult, MatchedBy, ResolutionRequest, Strategy,
};

static EAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{12,14}$").expect("valid ean regex"));

/// Optional French label in front of a subcode, accent-tolerant.
const SUBCODE_LABEL: &str =
    r"(?:num(?:é|e|&eacute;|&#233;)ro[\s_-]*(?:du[\s_-]*)?produit\s*(?:&nbsp;)?\s*[:#-]?\s*)?";

/// `true` for 12 to 14 ASCII digits.
#[must_use]
pub fn is_valid_ean(ean: &str) -> bool {
    EAN_RE.is_match(ean)
}

pub(crate) struct StrategyRun {
    pub(crate) matched: Option<MatchResult>,
    pub(crate) tried: Vec<AttemptRecord>,
}

impl StrategyRun {
    fn miss(tried: Vec<AttemptRecord>) -> Self {
        Self {
            matched: None,
            tried,
        }
    }
}

/// Page acceptance test for the exact-token strategies.
enum TokenMatcher {
    Pattern(Regex),
    Literal(String),
}

impl TokenMatcher {
    fn for_subcode(subcode: &str) -> Option<Self> {
        let pattern = format!(
            r"(?i)(?:^|[^0-9]){SUBCODE_LABEL}{}(?:[^0-9]|$)",
            regex::escape(subcode)
        );
        match Regex::new(&pattern) {
            Ok(re) => Some(Self::Pattern(re)),
            Err(e) => {
                tracing::warn!(subcode, error = %e, "could not build subcode pattern");
                None
            }
        }
    }

    fn matches(&self, body: &str) -> bool {
        match self {
            Self::Pattern(re) => re.is_match(body),
            Self::Literal(token) => body.contains(token.as_str()),
        }
    }
}

impl Resolver {
    pub(crate) async fn run_strategy(
        &self,
        strategy: Strategy,
        request: &ResolutionRequest,
    ) -> StrategyRun {
        let site = request.site.as_str();
        match strategy {
            Strategy::Subcode => match request.subcode.as_deref() {
                Some(subcode) => match TokenMatcher::for_subcode(subcode) {
                    Some(matcher) => {
                        self.run_token_strategy(strategy, site, subcode, &matcher)
                            .await
                    }
                    None => StrategyRun::miss(Vec::new()),
                },
                None => StrategyRun::miss(Vec::new()),
            },
            Strategy::Ean => match request.ean.as_deref().filter(|e| is_valid_ean(e)) {
                Some(ean) => {
                    let matcher = TokenMatcher::Literal(ean.to_owned());
                    self.run_token_strategy(strategy, site, ean, &matcher).await
                }
                None => StrategyRun::miss(Vec::new()),
            },
            Strategy::Name => match request.name.as_deref() {
                Some(name) => self.run_name_strategy(site, name).await,
                None => StrategyRun::miss(Vec::new()),
            },
        }
    }

    /// Searches `site:{site} {term}` and returns the filtered, capped list.
    /// A failed search is logged and yields no candidates.
    async fn candidates(&self, site: &str, term: &str) -> Vec<String> {
        let query = site_query(site, term);
        let url = match self.engine.search_url(&query) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(%query, error = %e, "could not build search URL");
                return Vec::new();
            }
        };

        match self.client.fetch_html(url.as_str()).await {
            Ok(html) => {
                let results = self.engine.parse_results(&html);
                let total = results.len();
                let kept = filter_candidates(results, site, self.max_candidates);
                tracing::debug!(%query, total, kept = kept.len(), "search results");
                kept
            }
            Err(e) => {
                tracing::warn!(%query, error = %e, "search request failed");
                Vec::new()
            }
        }
    }

    async fn run_token_strategy(
        &self,
        strategy: Strategy,
        site: &str,
        token: &str,
        matcher: &TokenMatcher,
    ) -> StrategyRun {
        let mut tried = Vec::new();

        for url in self.candidates(site, token).await {
            let html = match self.client.fetch_page(&url).await {
                PageFetch::Loaded(html) => html,
                PageFetch::Failed(reason) => {
                    tried.push(AttemptRecord::fetch_failed(&url, strategy, reason));
                    continue;
                }
            };

            if !matcher.matches(&html) {
                tried.push(AttemptRecord::token(&url, strategy, AttemptOutcome::NoToken));
                continue;
            }

            let Some(image_url) = self.extractor.extract_image(&html, &url) else {
                tracing::debug!(%strategy, %url, "token matched but no image found");
                tried.push(AttemptRecord::token(&url, strategy, AttemptOutcome::NoImage));
                continue;
            };

            tried.push(AttemptRecord::token(&url, strategy, AttemptOutcome::Matched));
            tracing::info!(%strategy, %url, %image_url, "token match");
            return StrategyRun {
                matched: Some(MatchResult {
                    image_url,
                    product_url: url,
                    matched_by: MatchedBy::Token,
                    score: 1.0,
                }),
                tried,
            };
        }

        StrategyRun::miss(tried)
    }

    /// Threshold gate, then first hit: the earliest candidate scoring at or
    /// above `name_threshold` that also yields an image wins, even if a later
    /// candidate would score higher.
    async fn run_name_strategy(&self, site: &str, name: &str) -> StrategyRun {
        let cleaned = clean_name(name);
        let query_tokens = tokenize(&cleaned);
        if query_tokens.is_empty() {
            tracing::debug!(name, "name is empty after cleanup; skipping search");
            return StrategyRun::miss(Vec::new());
        }

        let mut tried = Vec::new();

        for url in self.candidates(site, &cleaned).await {
            let html = match self.client.fetch_page(&url).await {
                PageFetch::Loaded(html) => html,
                PageFetch::Failed(reason) => {
                    tried.push(AttemptRecord::fetch_failed(&url, Strategy::Name, reason));
                    continue;
                }
            };

            let title = self.extractor.extract_title(&html);
            let score = title_score(&query_tokens, &title);
            let reported = round_score(score);

            if score < self.name_threshold {
                tried.push(AttemptRecord::titled(
                    &url,
                    title,
                    reported,
                    AttemptOutcome::BelowThreshold,
                ));
                continue;
            }

            let Some(image_url) = self.extractor.extract_image(&html, &url) else {
                tried.push(AttemptRecord::titled(
                    &url,
                    title,
                    reported,
                    AttemptOutcome::NoImage,
                ));
                continue;
            };

            tracing::info!(%url, %title, score = reported, "name match");
            tried.push(AttemptRecord::titled(
                &url,
                title,
                reported,
                AttemptOutcome::Matched,
            ));
            return StrategyRun {
                matched: Some(MatchResult {
                    image_url,
                    product_url: url,
                    matched_by: MatchedBy::Name,
                    score: reported,
                }),
                tried,
            };
        }

        StrategyRun::miss(tried)
    }
}

fn title_score(query_tokens: &HashSet<String>, title: &str) -> f64 {
    overlap_score(query_tokens, &tokenize(&clean_name(title)))
}

fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}
