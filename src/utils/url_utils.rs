//! URL manipulation utilities.
//!
//! Target normalization, query escaping and href resolution shared by
//! navigation and the extraction strategies.

use anyhow::{Result, anyhow};
use url::Url;

/// Normalize a user-supplied page address into an absolute http(s) URL.
///
/// Bare hosts such as `www.example.com` or `example.com/blog` get an
/// `https://` scheme. Any scheme other than http/https is rejected.
pub fn normalize_target_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("target URL is empty"));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| anyhow!("invalid URL '{trimmed}': {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!(
            "unsupported URL scheme '{}' in '{trimmed}' (only http and https)",
            url.scheme()
        ));
    }
    if url.host_str().is_none() {
        return Err(anyhow!("URL '{trimmed}' has no host"));
    }
    Ok(url)
}

/// Percent-encode a query string component.
///
/// Everything outside `A-Z a-z 0-9 - _ . ~` is escaped; a space becomes
/// `%20`, not `+`.
#[must_use]
pub fn percent_encode_query(query: &str) -> String {
    urlencoding::encode(query).into_owned()
}

/// Resolve an `href` attribute against the page URL.
///
/// Unlike `element.href` in the browser, an empty attribute and
/// `javascript:`, `mailto:` or `data:` references yield `None` instead of the
/// page URL or the literal reference, so records never point at them.
#[must_use]
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let joined = base.join(href).ok()?;
    if matches!(joined.scheme(), "javascript" | "mailto" | "data") {
        return None;
    }
    Some(joined.to_string())
}
