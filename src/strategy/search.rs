//! Search engine result pages

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::document::{PageDocument, inner_text, parse_selector};
use super::ExtractionStrategy;
use crate::errors::StrategyError;
use crate::navigation::SearchProvider;
use crate::types::ExtractedRecord;

/// CSS selectors locating results. All but `container` are scoped to one
/// container element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSelectors {
    pub container: String,
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl Default for SearchSelectors {
    fn default() -> Self {
        SearchProvider::default().selectors()
    }
}

/// One record per result container with `title`, `link` and `snippet`.
///
/// Containers without a title or a usable link are skipped; a missing
/// snippet becomes the sentinel.
#[derive(Debug, Clone, Default)]
pub struct SearchResultStrategy {
    selectors: SearchSelectors,
    limit: Option<usize>,
}

impl SearchResultStrategy {
    #[must_use]
    pub fn new(selectors: SearchSelectors) -> Self {
        Self {
            selectors,
            limit: None,
        }
    }

    #[must_use]
    pub fn for_provider(provider: SearchProvider) -> Self {
        Self::new(provider.selectors())
    }

    /// Stop after `limit` emitted records
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn selectors(&self) -> &SearchSelectors {
        &self.selectors
    }
}

impl ExtractionStrategy for SearchResultStrategy {
    fn name(&self) -> &str {
        "search"
    }

    fn read_records(&self, page: &PageDocument) -> Result<Vec<ExtractedRecord>, StrategyError> {
        let container = parse_selector(&self.selectors.container)?;
        let title_sel = parse_selector(&self.selectors.title)?;
        let link_sel = parse_selector(&self.selectors.link)?;
        let snippet_sel = parse_selector(&self.selectors.snippet)?;

        let records = page
            .select(&container)
            .enumerate()
            .filter_map(|(index, result)| {
                let title = result.select(&title_sel).next().map(|e| inner_text(&e));
                let link = result
                    .select(&link_sel)
                    .next()
                    .and_then(|e| page.absolute_href(&e));

                if title.is_none() || link.is_none() {
                    trace!(index, "skipping result without title or link");
                    return None;
                }

                let snippet = result.select(&snippet_sel).next().map(|e| inner_text(&e));
                Some(
                    ExtractedRecord::new()
                        .with("title", title)
                        .with("link", link)
                        .with("snippet", snippet),
                )
            })
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(records)
    }
}
