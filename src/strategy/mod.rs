//! Extraction strategies
//!
//! A strategy turns a rendered page into records. Strategies only ever see a
//! [`PageDocument`] captured after the page met its readiness condition, and
//! they are pure: the same snapshot always yields the same records.

pub mod document;
pub mod listing;
pub mod search;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::StrategyError;
use crate::navigation::SearchProvider;
use crate::types::{ExtractedRecord, ExtractionResult};

pub use document::{PageDocument, PageSnapshot, inner_text, parse_selector};
pub use listing::ListingStrategy;
pub use search::{SearchResultStrategy, SearchSelectors};

/// Reads records out of a rendered page
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs and error messages
    fn name(&self) -> &str;

    /// Records in document order. An empty vector means the page had no
    /// matching elements; configuration problems are errors.
    fn read_records(&self, page: &PageDocument) -> Result<Vec<ExtractedRecord>, StrategyError>;

    /// Optional page-level value such as the page heading
    fn read_scalar(&self, _page: &PageDocument) -> Result<Option<String>, StrategyError> {
        Ok(None)
    }
}

/// Parse `snapshot` and run `strategy` over it.
///
/// Synchronous and CPU-bound; async callers run it on the blocking pool.
pub fn run_strategy(
    strategy: &dyn ExtractionStrategy,
    snapshot: &PageSnapshot,
) -> Result<ExtractionResult, StrategyError> {
    let page = PageDocument::parse(snapshot);
    let records = strategy.read_records(&page)?;
    let page_title = strategy.read_scalar(&page)?;
    Ok(ExtractionResult::new(records, page_title))
}

/// Built-in strategies selectable by name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrategyName {
    #[default]
    Search,
    Listing,
}

impl StrategyName {
    /// Instantiate with default configuration. `provider` picks the result
    /// selectors for [`StrategyName::Search`].
    #[must_use]
    pub fn build(self, provider: SearchProvider) -> Arc<dyn ExtractionStrategy> {
        match self {
            Self::Search => Arc::new(SearchResultStrategy::for_provider(provider)),
            Self::Listing => Arc::new(ListingStrategy::default()),
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Search => "search",
            Self::Listing => "listing",
        })
    }
}

impl FromStr for StrategyName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" | "search-results" => Ok(Self::Search),
            "listing" | "articles" => Ok(Self::Listing),
            other => Err(format!(
                "unknown strategy '{other}' (expected search or listing)"
            )),
        }
    }
}
