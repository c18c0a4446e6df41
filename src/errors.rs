//! Error types for extraction runs
//!
//! Each pipeline stage has its own failure type; [`ExtractError`] wraps them
//! together with the target being processed so a single message tells the
//! caller which stage failed and for what.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::types::ExtractionResult;

/// Convenience alias for Result with `ExtractError`
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Pipeline stage a failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Launch,
    Navigation,
    Extraction,
    Sink,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::Launch => "launch",
            Self::Navigation => "navigation",
            Self::Extraction => "extraction",
            Self::Sink => "sink",
        };
        f.write_str(name)
    }
}

/// The browser process could not be started
#[derive(Debug, Error)]
#[error("browser launch failed: {reason}")]
pub struct LaunchError {
    pub reason: String,
}

impl LaunchError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for LaunchError {
    fn from(err: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain
        Self::new(format!("{err:#}"))
    }
}

/// The page failed to load or never became ready
///
/// Carries the target and elapsed time so callers can build their own retry
/// policy on top.
#[derive(Debug, Error)]
#[error("{reason} (target {target}, after {} ms)", .elapsed.as_millis())]
pub struct NavigationError {
    pub target: String,
    pub elapsed: Duration,
    pub reason: String,
}

/// A strategy could not read the page
#[derive(Debug, Error)]
pub enum StrategyError {
    /// A configured CSS selector does not parse
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The strategy panicked or its worker task was lost
    #[error("strategy '{0}' aborted unexpectedly")]
    Aborted(String),

    #[error("{0}")]
    Other(String),
}

/// Writing a result to a sink failed
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to move temporary file into place: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("destination path has no parent directory: {0}")]
    NoParent(String),

    #[error("callback rejected result: {0}")]
    Callback(String),

    /// The blocking writer task panicked or timed out
    #[error("sink task failed: {0}")]
    Task(String),
}

/// The error type returned by an extraction run
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Target could not be turned into a navigable URL
    #[error("setup failed for '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Settings could not be resolved
    #[error("setup failed: {0}")]
    Config(String),

    #[error("launch stage failed for {target}: {source}")]
    Launch {
        target: String,
        #[source]
        source: LaunchError,
    },

    #[error("navigation stage failed: {0}")]
    Navigation(#[from] NavigationError),

    #[error("extraction stage failed for {target}: {source}")]
    Extraction {
        target: String,
        #[source]
        source: StrategyError,
    },

    /// Persisting failed; the computed result is still available through
    /// [`ExtractError::into_result`].
    #[error("sink stage failed for {target}: {source}")]
    Sink {
        target: String,
        result: Box<ExtractionResult>,
        #[source]
        source: SinkError,
    },

    /// The caller-supplied run timeout fired before extraction finished
    #[error("run timed out for {target} after {} ms", .elapsed.as_millis())]
    Timeout { target: String, elapsed: Duration },
}

impl ExtractError {
    /// Stage the failure originated from
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidTarget { .. } | Self::Config(_) => Stage::Setup,
            Self::Launch { .. } => Stage::Launch,
            Self::Navigation(_) | Self::Timeout { .. } => Stage::Navigation,
            Self::Extraction { .. } => Stage::Extraction,
            Self::Sink { .. } => Stage::Sink,
        }
    }

    /// Target being processed, if one was resolved
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Config(_) => None,
            Self::InvalidTarget { target, .. }
            | Self::Launch { target, .. }
            | Self::Extraction { target, .. }
            | Self::Sink { target, .. }
            | Self::Timeout { target, .. } => Some(target),
            Self::Navigation(e) => Some(&e.target),
        }
    }

    /// Whether a caller-level retry has a reasonable chance of succeeding.
    ///
    /// The pipeline itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Navigation(_) | Self::Timeout { .. })
    }

    /// Result that was computed before the failure, if any
    #[must_use]
    pub fn partial_result(&self) -> Option<&ExtractionResult> {
        match self {
            Self::Sink { result, .. } => Some(result),
            _ => None,
        }
    }

    /// Take the computed result out of a sink failure
    #[must_use]
    pub fn into_result(self) -> Option<ExtractionResult> {
        match self {
            Self::Sink { result, .. } => Some(*result),
            _ => None,
        }
    }

    /// Process exit code for the command-line front end
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidTarget { .. } | Self::Config(_) => 2,
            Self::Launch { .. } => 3,
            Self::Navigation(_) | Self::Timeout { .. } => 4,
            Self::Extraction { .. } => 5,
            Self::Sink { .. } => 6,
        }
    }
}
