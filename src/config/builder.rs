//! Type-safe builder for `ExtractRequest` using the typestate pattern
//!
//! A request cannot be built until both a target and a strategy are set;
//! forgetting either is a compile error rather than a runtime one.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::types::ExtractRequest;
use crate::errors::ExtractError;
use crate::navigation::{ReadinessCondition, Target};
use crate::sink::ResultSink;
use crate::strategy::ExtractionStrategy;

// Type states for the builder
pub struct WithTarget;
pub struct Complete;

pub struct ExtractRequestBuilder<State = ()> {
    pub(crate) target: Option<Target>,
    pub(crate) strategy: Option<Arc<dyn ExtractionStrategy>>,
    pub(crate) readiness: Option<ReadinessCondition>,
    pub(crate) output_path: Option<PathBuf>,
    pub(crate) run_timeout: Option<Duration>,
    pub(crate) sinks: Vec<Arc<dyn ResultSink>>,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ExtractRequestBuilder<()> {
    fn default() -> Self {
        Self {
            target: None,
            strategy: None,
            readiness: None,
            output_path: None,
            run_timeout: None,
            sinks: Vec::new(),
            _phantom: PhantomData,
        }
    }
}

impl ExtractRequest {
    /// Create a builder for configuring an `ExtractRequest` with a fluent interface
    #[must_use]
    pub fn builder() -> ExtractRequestBuilder<()> {
        ExtractRequestBuilder::default()
    }
}

impl<State> ExtractRequestBuilder<State> {
    fn into_state<Next>(self) -> ExtractRequestBuilder<Next> {
        ExtractRequestBuilder {
            target: self.target,
            strategy: self.strategy,
            readiness: self.readiness,
            output_path: self.output_path,
            run_timeout: self.run_timeout,
            sinks: self.sinks,
            _phantom: PhantomData,
        }
    }
}

impl ExtractRequestBuilder<()> {
    pub fn target(mut self, target: Target) -> ExtractRequestBuilder<WithTarget> {
        self.target = Some(target);
        self.into_state()
    }
}

impl ExtractRequestBuilder<WithTarget> {
    pub fn strategy<S>(self, strategy: S) -> ExtractRequestBuilder<Complete>
    where
        S: ExtractionStrategy + 'static,
    {
        self.shared_strategy(Arc::new(strategy))
    }

    pub fn shared_strategy(
        mut self,
        strategy: Arc<dyn ExtractionStrategy>,
    ) -> ExtractRequestBuilder<Complete> {
        self.strategy = Some(strategy);
        self.into_state()
    }
}

// Build method only available when all required fields are set
impl ExtractRequestBuilder<Complete> {
    /// Finish the request.
    ///
    /// Without an explicit readiness condition, query targets wait for the
    /// network to settle (at most 2 requests in flight for 500 ms) and URL
    /// targets wait for DOM content.
    pub fn build(self) -> Result<ExtractRequest, ExtractError> {
        let target = self
            .target
            .ok_or_else(|| ExtractError::Config("target is required".into()))?;
        let strategy = self
            .strategy
            .ok_or_else(|| ExtractError::Config("strategy is required".into()))?;

        let readiness = self
            .readiness
            .unwrap_or_else(|| ReadinessCondition::default_for(&target));

        Ok(ExtractRequest {
            target,
            strategy,
            readiness,
            output_path: self.output_path,
            run_timeout: self.run_timeout,
            sinks: self.sinks,
        })
    }
}
