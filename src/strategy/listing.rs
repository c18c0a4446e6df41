//! Article and post listings

use super::document::{PageDocument, inner_text, parse_selector};
use super::ExtractionStrategy;
use crate::errors::StrategyError;
use crate::types::ExtractedRecord;

/// Title-link patterns commonly used by blog and news index pages
pub const DEFAULT_LISTING_PATTERNS: [&str; 3] = ["h3 a", ".post-title a", ".article-title a"];

/// One `title`/`url` record per anchor matching any of the patterns.
///
/// Anchors are visited once each, in document order, even when several
/// patterns match the same element. Empty link text is kept as `""`.
#[derive(Debug, Clone)]
pub struct ListingStrategy {
    patterns: Vec<String>,
    heading: String,
}

impl Default for ListingStrategy {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_LISTING_PATTERNS.iter().map(ToString::to_string).collect(),
            heading: "h1".to_string(),
        }
    }
}

impl ListingStrategy {
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Selector whose first match becomes the page title
    #[must_use]
    pub fn with_heading(mut self, selector: impl Into<String>) -> Self {
        self.heading = selector.into();
        self
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl ExtractionStrategy for ListingStrategy {
    fn name(&self) -> &str {
        "listing"
    }

    fn read_records(&self, page: &PageDocument) -> Result<Vec<ExtractedRecord>, StrategyError> {
        if self.patterns.is_empty() {
            return Err(StrategyError::Other(
                "listing strategy needs at least one pattern".into(),
            ));
        }
        // Validate one at a time so the error names the bad pattern
        for pattern in &self.patterns {
            parse_selector(pattern)?;
        }
        let anchors = parse_selector(&self.patterns.join(", "))?;

        Ok(page
            .select(&anchors)
            .map(|anchor| {
                ExtractedRecord::new()
                    .with("title", Some(inner_text(&anchor)))
                    .with("url", page.absolute_href(&anchor))
            })
            .collect())
    }

    fn read_scalar(&self, page: &PageDocument) -> Result<Option<String>, StrategyError> {
        let heading = parse_selector(&self.heading)?;
        Ok(page.select(&heading).next().map(|e| inner_text(&e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::NOT_AVAILABLE;

    #[test]
    fn overlapping_patterns_yield_each_anchor_once() {
        let page = PageDocument::from_html(
            r#"<h3 class="post-title"><a href="/a">A</a></h3>
               <div class="article-title"><a href="/b">B</a></div>"#,
            "https://blog.test/",
        );
        let records = ListingStrategy::default().read_records(&page).unwrap();
        let titles: Vec<_> = records.iter().filter_map(|r| r.get("title")).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn anchor_without_href_gets_sentinel_url() {
        let page = PageDocument::from_html("<h3><a>Draft</a></h3>", "https://blog.test/");
        let records = ListingStrategy::default().read_records(&page).unwrap();
        assert_eq!(records[0].get("url"), Some(NOT_AVAILABLE));
    }

    #[test]
    fn heading_is_the_scalar() {
        let strategy = ListingStrategy::default();
        let with_heading = PageDocument::from_html("<h1>  My Blog </h1>", "https://blog.test/");
        let without = PageDocument::from_html("<p>nothing</p>", "https://blog.test/");
        assert_eq!(
            strategy.read_scalar(&with_heading).unwrap().as_deref(),
            Some("My Blog")
        );
        assert_eq!(strategy.read_scalar(&without).unwrap(), None);
    }

    #[test]
    fn empty_heading_is_an_empty_scalar() {
        let page = PageDocument::from_html("<h1> </h1><h3><a href='/a'>A</a></h3>", "https://blog.test/");
        assert_eq!(
            ListingStrategy::default().read_scalar(&page).unwrap().as_deref(),
            Some("")
        );
    }

    #[test]
    fn empty_pattern_list_is_rejected() {
        let page = PageDocument::from_html("", "https://blog.test/");
        let strategy = ListingStrategy::new(Vec::<String>::new());
        assert!(strategy.read_records(&page).is_err());
    }
}
