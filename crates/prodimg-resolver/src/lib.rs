pub mod client;
pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod search;
pub mod similarity;
pub mod strategy;
pub mod types;

pub use client::{PageClient, PageFetch};
pub use dispatcher::Resolver;
pub use error::ResolverError;
pub use extract::{resolve_image_url, PageExtractor, RegexExtractor};
pub use normalize::{clean_name, tokenize};
pub use search::{filter_candidates, site_query, DuckDuckGoHtml, SearchEngine};
pub use similarity::overlap_score;
pub use strategy::is_valid_ean;
pub use types::{
    AttemptOutcome, AttemptRecord, MatchResult, MatchedBy, ResolutionBody, ResolutionOutcome,
    ResolutionRequest, Strategy,
};
