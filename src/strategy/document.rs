//! Parsed page DOM handed to strategies

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::errors::StrategyError;
use crate::utils::resolve_href;

/// Serialized DOM captured from the live page after readiness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    /// URL the page ended up at, after redirects
    pub url: String,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Read-only view of a rendered page
pub struct PageDocument {
    html: Html,
    base: Option<Url>,
}

impl PageDocument {
    #[must_use]
    pub fn parse(snapshot: &PageSnapshot) -> Self {
        Self::from_html(&snapshot.html, &snapshot.url)
    }

    /// `base_url` is used to absolutize hrefs; an unparseable base leaves
    /// only already-absolute hrefs resolvable.
    #[must_use]
    pub fn from_html(html: &str, base_url: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            base: Url::parse(base_url).ok(),
        }
    }

    #[must_use]
    pub fn html(&self) -> &Html {
        &self.html
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    /// Elements matching `selector`, in document order
    pub fn select<'a>(&'a self, selector: &'a Selector) -> impl Iterator<Item = ElementRef<'a>> {
        self.html.select(selector)
    }

    /// Absolute form of an element's `href`, `None` when missing or unusable
    #[must_use]
    pub fn absolute_href(&self, element: &ElementRef<'_>) -> Option<String> {
        let href = element.value().attr("href")?;
        match &self.base {
            Some(base) => resolve_href(base, href),
            None => Url::parse(href.trim()).ok().map(String::from),
        }
    }
}

/// Compile a CSS selector, reporting which one failed
pub fn parse_selector(selector: &str) -> Result<Selector, StrategyError> {
    Selector::parse(selector).map_err(|e| StrategyError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Visible-ish text of an element with whitespace runs collapsed and trimmed.
///
/// An element without text yields `""`; absence is the caller's concern.
#[must_use]
pub fn inner_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_collapsed_and_trimmed() {
        let doc = PageDocument::from_html(
            "<p id='x'>  Hello \n <b>big</b>\t world  </p><p id='y'>   </p>",
            "https://a.test/",
        );
        let p = parse_selector("p").unwrap();
        let texts: Vec<_> = doc.select(&p).map(|e| inner_text(&e)).collect();
        assert_eq!(texts, vec!["Hello big world".to_string(), String::new()]);
    }

    #[test]
    fn hrefs_resolve_against_final_url() {
        let doc = PageDocument::from_html(
            "<a href='/post/1'>a</a><a href='javascript:void(0)'>b</a><a>c</a>",
            "https://blog.test/index.html",
        );
        let a = parse_selector("a").unwrap();
        let hrefs: Vec<_> = doc.select(&a).map(|e| doc.absolute_href(&e)).collect();
        assert_eq!(
            hrefs,
            vec![Some("https://blog.test/post/1".to_string()), None, None]
        );
    }

    #[test]
    fn bad_selector_is_reported() {
        let err = parse_selector("div[").unwrap_err();
        assert!(matches!(err, StrategyError::InvalidSelector { ref selector, .. } if selector == "div["));
    }
}
