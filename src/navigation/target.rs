//! Navigation targets and search providers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::errors::ExtractError;
use crate::strategy::SearchSelectors;
use crate::utils::{MAX_QUERY_LENGTH, normalize_target_url, percent_encode_query};

// =============================================================================
// Search providers
// =============================================================================

/// Search engine a query target is sent to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    #[default]
    Google,
    DuckDuckGo,
}

impl SearchProvider {
    /// Results page the query parameter is appended to
    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Google => "https://www.google.com/search",
            Self::DuckDuckGo => "https://duckduckgo.com/",
        }
    }

    /// Name of the query-string parameter carrying the search terms
    #[must_use]
    pub fn query_param(self) -> &'static str {
        "q"
    }

    /// Fixed parameters appended after the query
    #[must_use]
    pub fn extra_params(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Google => &[],
            // Force the web vertical; DuckDuckGo otherwise may pick another tab
            Self::DuckDuckGo => &[("ia", "web")],
        }
    }

    /// Result-page selectors this provider currently uses
    #[must_use]
    pub fn selectors(self) -> SearchSelectors {
        match self {
            Self::Google => SearchSelectors {
                container: "div.g".into(),
                title: "h3".into(),
                link: "a[href]".into(),
                snippet: "div.VwiC3b".into(),
            },
            Self::DuckDuckGo => SearchSelectors {
                container: "article[data-testid='result']".into(),
                title: "h2 > a".into(),
                link: "h2 > a".into(),
                snippet: "div[data-result='snippet']".into(),
            },
        }
    }
}

impl fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Google => "google",
            Self::DuckDuckGo => "duckduckgo",
        })
    }
}

impl FromStr for SearchProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "duckduckgo" | "ddg" => Ok(Self::DuckDuckGo),
            other => Err(format!(
                "unknown search provider '{other}' (expected google or duckduckgo)"
            )),
        }
    }
}

// =============================================================================
// Targets
// =============================================================================

/// How a raw target string should be interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    /// Search terms sent to a provider
    Query,
    /// Literal page address
    #[default]
    Url,
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Url => "url",
        })
    }
}

impl FromStr for TargetMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "query" => Ok(Self::Query),
            "url" => Ok(Self::Url),
            other => Err(format!("unknown mode '{other}' (expected query or url)")),
        }
    }
}

/// Page to extract from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Url(Url),
    Query {
        query: String,
        provider: SearchProvider,
        /// Results page; [`SearchProvider::base_url`] unless overridden
        base_url: Url,
    },
}

impl Target {
    /// Literal page address; a missing scheme defaults to https
    pub fn url(raw: &str) -> Result<Self, ExtractError> {
        normalize_target_url(raw)
            .map(Self::Url)
            .map_err(|e| ExtractError::InvalidTarget {
                target: raw.to_string(),
                reason: e.to_string(),
            })
    }

    /// Search query for `provider`
    pub fn query(raw: &str, provider: SearchProvider) -> Result<Self, ExtractError> {
        let query = raw.trim();

        if query.is_empty() {
            return Err(ExtractError::InvalidTarget {
                target: raw.to_string(),
                reason: "search query cannot be empty or whitespace-only".into(),
            });
        }

        let length = query.chars().count();
        if length > MAX_QUERY_LENGTH {
            return Err(ExtractError::InvalidTarget {
                target: raw.to_string(),
                reason: format!(
                    "search query is too long ({length} characters, maximum {MAX_QUERY_LENGTH})"
                ),
            });
        }

        let base_url = Url::parse(provider.base_url()).map_err(|e| ExtractError::InvalidTarget {
            target: raw.to_string(),
            reason: format!("bad base URL for {provider}: {e}"),
        })?;

        Ok(Self::Query {
            query: query.to_string(),
            provider,
            base_url,
        })
    }

    /// Interpret `raw` according to `mode`
    pub fn parse(raw: &str, mode: TargetMode, provider: SearchProvider) -> Result<Self, ExtractError> {
        match mode {
            TargetMode::Url => Self::url(raw),
            TargetMode::Query => Self::query(raw, provider),
        }
    }

    /// Point a query target at a different results page. No effect on URL targets.
    #[must_use]
    pub fn with_base_url(self, url: Url) -> Self {
        match self {
            Self::Query {
                query, provider, ..
            } => Self::Query {
                query,
                provider,
                base_url: url,
            },
            other => other,
        }
    }

    #[must_use]
    pub fn mode(&self) -> TargetMode {
        match self {
            Self::Url(_) => TargetMode::Url,
            Self::Query { .. } => TargetMode::Query,
        }
    }

    /// Destination URL.
    ///
    /// For queries the terms are percent-encoded into the provider's query
    /// parameter, after any query string already present on the base URL.
    #[must_use]
    pub fn resolve(&self) -> Url {
        match self {
            Self::Url(url) => url.clone(),
            Self::Query {
                query,
                provider,
                base_url,
            } => {
                let mut url = base_url.clone();

                let mut pairs = vec![format!(
                    "{}={}",
                    provider.query_param(),
                    percent_encode_query(query)
                )];
                pairs.extend(
                    provider
                        .extra_params()
                        .iter()
                        .map(|(k, v)| format!("{k}={}", percent_encode_query(v))),
                );

                let query_string = match url.query().filter(|q| !q.is_empty()) {
                    Some(existing) => format!("{existing}&{}", pairs.join("&")),
                    None => pairs.join("&"),
                };
                url.set_query(Some(&query_string));
                url
            }
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Query {
                query, provider, ..
            } => write!(f, "{provider} query \"{query}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_query_url_is_percent_encoded() {
        let target = Target::query("escrapeando con Playwright", SearchProvider::Google).unwrap();
        assert_eq!(
            target.resolve().as_str(),
            "https://www.google.com/search?q=escrapeando%20con%20Playwright"
        );
    }

    #[test]
    fn reserved_characters_are_escaped() {
        let target = Target::query("a&b=c/d?", SearchProvider::Google).unwrap();
        assert_eq!(
            target.resolve().query(),
            Some("q=a%26b%3Dc%2Fd%3F")
        );
    }

    #[test]
    fn duckduckgo_adds_web_vertical() {
        let target = Target::query("rust async", SearchProvider::DuckDuckGo).unwrap();
        assert_eq!(
            target.resolve().as_str(),
            "https://duckduckgo.com/?q=rust%20async&ia=web"
        );
    }

    #[test]
    fn base_url_override_keeps_existing_query() {
        let base = Url::parse("http://127.0.0.1:8080/find?lang=en").unwrap();
        let target = Target::query("foo bar", SearchProvider::Google)
            .unwrap()
            .with_base_url(base);
        assert_eq!(
            target.resolve().as_str(),
            "http://127.0.0.1:8080/find?lang=en&q=foo%20bar"
        );
    }

    #[test]
    fn empty_and_oversized_queries_are_rejected() {
        assert!(Target::query("   ", SearchProvider::Google).is_err());
        let long = "x".repeat(MAX_QUERY_LENGTH + 1);
        assert!(Target::query(&long, SearchProvider::Google).is_err());
    }

    #[test]
    fn url_mode_normalizes_scheme() {
        let target = Target::parse("www.google.com", TargetMode::Url, SearchProvider::Google).unwrap();
        assert_eq!(target.resolve().as_str(), "https://www.google.com/");
        assert_eq!(target.mode(), TargetMode::Url);
    }
}
