//! Core configuration types for extraction runs
//!
//! `SessionConfig` describes the browser side, `ExtractSettings` layers the
//! environment on top of the defaults, and `ExtractRequest` is one fully
//! specified run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::errors::ExtractError;
use crate::navigation::{ReadinessCondition, Target};
use crate::sink::ResultSink;
use crate::strategy::ExtractionStrategy;
use crate::utils::{
    DEFAULT_TIMEOUT_MS, DEFAULT_WINDOW_SIZE, ENV_BASE_URL, ENV_CHROMIUM_PATH, ENV_HEADLESS,
    ENV_TIMEOUT_MS,
};

/// Browser session options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Run without a visible window. Default: true
    pub headless: bool,

    /// Upper bound for launching the browser and for a page reaching its
    /// readiness condition, in milliseconds. Default: 30000
    pub timeout_ms: u64,

    pub window_size: (u32, u32),

    /// Verbatim `User-Agent` override; the browser default is used when unset
    pub user_agent: Option<String>,

    /// Explicit browser binary; discovery is used when unset
    pub chrome_executable: Option<PathBuf>,

    /// Extra command-line switches passed to the browser
    pub args: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            window_size: DEFAULT_WINDOW_SIZE,
            user_agent: None,
            chrome_executable: None,
            args: Vec::new(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Defaults plus whatever the environment overrides
///
/// Recognized variables: `WEBEXTRACT_HEADLESS`, `WEBEXTRACT_BASE_URL`,
/// `WEBEXTRACT_TIMEOUT_MS` and `CHROMIUM_PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSettings {
    pub session: SessionConfig,

    /// Replaces the search provider's base URL for query targets
    pub base_url: Option<Url>,
}

impl ExtractSettings {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self, ExtractError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ExtractError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup(ENV_HEADLESS) {
            settings.session.headless = parse_bool(&raw).ok_or_else(|| {
                ExtractError::Config(format!("{ENV_HEADLESS} must be true or false, got '{raw}'"))
            })?;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let timeout_ms = raw.trim().parse::<u64>().map_err(|e| {
                ExtractError::Config(format!("{ENV_TIMEOUT_MS} is not a number ('{raw}'): {e}"))
            })?;
            if timeout_ms == 0 {
                return Err(ExtractError::Config(format!(
                    "{ENV_TIMEOUT_MS} must be greater than zero"
                )));
            }
            settings.session.timeout_ms = timeout_ms;
        }

        if let Some(raw) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            let url = Url::parse(raw.trim()).map_err(|e| {
                ExtractError::Config(format!("{ENV_BASE_URL} is not a valid URL ('{raw}'): {e}"))
            })?;
            settings.base_url = Some(url);
        }

        if let Some(raw) = lookup(ENV_CHROMIUM_PATH).filter(|v| !v.trim().is_empty()) {
            settings.session.chrome_executable = Some(PathBuf::from(raw));
        }

        Ok(settings)
    }

    /// Point query targets at the configured base URL, if any
    #[must_use]
    pub fn apply_to(&self, target: Target) -> Target {
        match &self.base_url {
            Some(url) => target.with_base_url(url.clone()),
            None => target,
        }
    }

    /// Copy of `request` with [`apply_to`](Self::apply_to) applied to its target
    #[must_use]
    pub fn apply_to_request(&self, request: &ExtractRequest) -> ExtractRequest {
        let mut request = request.clone();
        request.target = self.apply_to(request.target);
        request
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// One fully specified extraction run
///
/// Built through [`ExtractRequest::builder`]; the target is immutable once
/// built.
#[derive(Clone)]
pub struct ExtractRequest {
    pub(crate) target: Target,
    pub(crate) strategy: Arc<dyn ExtractionStrategy>,
    pub(crate) readiness: ReadinessCondition,
    pub(crate) output_path: Option<PathBuf>,
    pub(crate) run_timeout: Option<Duration>,
    pub(crate) sinks: Vec<Arc<dyn ResultSink>>,
}

impl fmt::Debug for ExtractRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractRequest")
            .field("target", &self.target)
            .field("strategy", &self.strategy.name())
            .field("readiness", &self.readiness)
            .field("output_path", &self.output_path)
            .field("run_timeout", &self.run_timeout)
            .field(
                "sinks",
                &self.sinks.iter().map(|s| s.name().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let settings = ExtractSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, ExtractSettings::default());
        assert!(settings.session.headless);
        assert_eq!(settings.session.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = ExtractSettings::from_lookup(lookup(&[
            (ENV_HEADLESS, "false"),
            (ENV_TIMEOUT_MS, "5000"),
            (ENV_BASE_URL, "https://search.internal/find"),
        ]))
        .unwrap();

        assert!(!settings.session.headless);
        assert_eq!(settings.session.timeout(), Duration::from_secs(5));
        assert_eq!(
            settings.base_url.as_ref().map(Url::as_str),
            Some("https://search.internal/find")
        );
    }

    #[test]
    fn malformed_values_are_config_errors() {
        for pairs in [
            [(ENV_HEADLESS, "maybe")],
            [(ENV_TIMEOUT_MS, "soon")],
            [(ENV_TIMEOUT_MS, "0")],
            [(ENV_BASE_URL, "not a url")],
        ] {
            let err = ExtractSettings::from_lookup(lookup(&pairs)).unwrap_err();
            assert!(matches!(err, ExtractError::Config(_)), "{pairs:?}");
        }
    }
}
