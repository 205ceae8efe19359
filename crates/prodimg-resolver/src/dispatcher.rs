//! Strategy ordering and the public [`Resolver`] entry point.

use prodimg_core::ResolverSettings;

use crate::client::PageClient;
use crate::error::ResolverError;
use crate::extract::{PageExtractor, RegexExtractor};
use crate::search::{DuckDuckGoHtml, SearchEngine};
use crate::strategy::is_valid_ean;
use crate::types::{ResolutionOutcome, ResolutionRequest, Strategy};

/// Resolves product identifiers to an image URL on a target site.
///
/// Immutable after construction; share it across requests behind an `Arc`.
pub struct Resolver {
    pub(crate) client: PageClient,
    pub(crate) engine: Box<dyn SearchEngine>,
    pub(crate) extractor: Box<dyn PageExtractor>,
    pub(crate) max_candidates: usize,
    pub(crate) name_threshold: f64,
}

impl Resolver {
    /// Builds a resolver with the DuckDuckGo HTML backend and the regex extractor.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: &ResolverSettings) -> Result<Self, ResolverError> {
        Ok(Self {
            client: PageClient::new(settings.request_timeout_secs, &settings.user_agent)?,
            engine: Box::new(DuckDuckGoHtml::new(settings.search_url.clone())),
            extractor: Box::new(RegexExtractor),
            max_candidates: settings.max_candidates,
            name_threshold: settings.name_threshold,
        })
    }

    #[must_use]
    pub fn with_engine(mut self, engine: Box<dyn SearchEngine>) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn PageExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Runs subcode, EAN, then name strategies, stopping at the first match.
    ///
    /// Upstream failures never surface here; they end up in the trace.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::MissingIdentifier`] when the request carries
    /// no subcode, EAN or name.
    pub async fn resolve(
        &self,
        request: &ResolutionRequest,
    ) -> Result<ResolutionOutcome, ResolverError> {
        request.validate()?;

        let mut tried = Vec::new();
        let mut matched = None;
        let mut stage = Stage::NotStarted.advance(request);

        while let Some(strategy) = stage.strategy() {
            let run = self.run_strategy(strategy, request).await;
            tried.extend(run.tried);
            if let Some(result) = run.matched {
                matched = Some(result);
                stage = Stage::Succeeded;
            } else {
                stage = stage.advance(request);
            }
        }

        tracing::info!(
            site = %request.site,
            ?stage,
            attempts = tried.len(),
            "resolution finished"
        );

        Ok(match matched {
            Some(result) => ResolutionOutcome::Matched { result, tried },
            None => ResolutionOutcome::Exhausted { tried },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    NotStarted,
    TryingSubcode,
    TryingEan,
    TryingName,
    Succeeded,
    Exhausted,
}

impl Stage {
    const ORDER: [Stage; 3] = [Stage::TryingSubcode, Stage::TryingEan, Stage::TryingName];

    /// Next applicable strategy stage after `self`, or `Exhausted`.
    /// Terminal stages stay put.
    fn advance(self, request: &ResolutionRequest) -> Stage {
        let start = match self {
            Stage::NotStarted => 0,
            Stage::TryingSubcode => 1,
            Stage::TryingEan => 2,
            Stage::TryingName => 3,
            Stage::Succeeded | Stage::Exhausted => return self,
        };
        Self::ORDER[start..]
            .iter()
            .copied()
            .find(|s| s.applies_to(request))
            .unwrap_or(Stage::Exhausted)
    }

    fn applies_to(self, request: &ResolutionRequest) -> bool {
        match self {
            Stage::TryingSubcode => request.subcode.is_some(),
            Stage::TryingEan => request.ean.as_deref().is_some_and(is_valid_ean),
            Stage::TryingName => request.name.is_some(),
            _ => false,
        }
    }

    fn strategy(self) -> Option<Strategy> {
        match self {
            Stage::TryingSubcode => Some(Strategy::Subcode),
            Stage::TryingEan => Some(Strategy::Ean),
            Stage::TryingName => Some(Strategy::Name),
            _ => None,
        }
    }
}
