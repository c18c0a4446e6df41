//! Getter methods for `ExtractRequest`

use std::path::Path;
use std::time::Duration;

use super::types::ExtractRequest;
use crate::navigation::{ReadinessCondition, Target};
use crate::strategy::ExtractionStrategy;

impl ExtractRequest {
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    #[must_use]
    pub fn strategy(&self) -> &dyn ExtractionStrategy {
        self.strategy.as_ref()
    }

    #[must_use]
    pub fn readiness(&self) -> ReadinessCondition {
        self.readiness
    }

    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    #[must_use]
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout
    }

    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}
