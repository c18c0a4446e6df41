//! Builder methods available for all states
//!
//! This module contains methods that can be called on the builder
//! regardless of its current type state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::builder::ExtractRequestBuilder;
use crate::navigation::ReadinessCondition;
use crate::sink::ResultSink;

impl<State> ExtractRequestBuilder<State> {
    /// Condition the page must reach before extraction starts
    #[must_use]
    pub fn readiness(mut self, readiness: ReadinessCondition) -> Self {
        self.readiness = Some(readiness);
        self
    }

    /// Persist the result as pretty-printed JSON at `path`.
    ///
    /// Any existing file there is replaced atomically.
    #[must_use]
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Bound navigation plus extraction as a whole.
    ///
    /// When it fires the run is released and fails with a timeout error.
    #[must_use]
    pub fn run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn sink(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    #[must_use]
    pub fn shared_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}
