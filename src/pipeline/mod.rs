//! Extraction pipeline
//!
//! One run walks `Idle -> SessionAcquired -> Navigated -> Extracted ->
//! Emitted -> Released`. Any failure after the session was acquired jumps to
//! `Released`, so every acquired session is released exactly once no matter
//! how the run ends.

pub mod retry;
pub mod state;

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{ExtractRequest, SessionConfig};
use crate::errors::{ExtractError, StrategyError};
use crate::navigation::navigate;
use crate::session::{BrowserBackend, ChromeBackend, CleanupReport, SessionHandle};
use crate::sink::{JsonFileSink, ResultSink};
use crate::strategy::run_strategy;
use crate::types::ExtractionResult;

pub use retry::{RetryPolicy, retry_with_backoff};
pub use state::PipelineState;

use state::StateTrail;

/// What happened during one run, successful or not
#[derive(Debug, Clone)]
pub struct RunReport {
    pub target: String,
    pub session_id: Option<u64>,
    /// States in the order they were entered, starting with `Idle`
    pub states: Vec<PipelineState>,
    pub records: usize,
    pub elapsed: Duration,
    /// Teardown outcome; `None` when no session was acquired
    pub cleanup: Option<CleanupReport>,
}

impl RunReport {
    #[must_use]
    pub fn final_state(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Idle)
    }
}

/// Runs extraction requests against browsers from one backend.
///
/// Cheap to clone. Runs share nothing but the backend, so any number may
/// execute concurrently.
#[derive(Clone)]
pub struct ExtractionPipeline {
    backend: Arc<dyn BrowserBackend>,
    session: SessionConfig,
}

impl ExtractionPipeline {
    pub fn new(backend: Arc<dyn BrowserBackend>, session: SessionConfig) -> Self {
        Self { backend, session }
    }

    /// Pipeline launching a local Chromium for every run
    #[must_use]
    pub fn chromium(session: SessionConfig) -> Self {
        Self::new(Arc::new(ChromeBackend), session)
    }

    #[must_use]
    pub fn session_config(&self) -> &SessionConfig {
        &self.session
    }

    pub async fn run(&self, request: &ExtractRequest) -> Result<ExtractionResult, ExtractError> {
        self.run_with_report(request).await.0
    }

    /// Like [`run`](Self::run), also returning the state trail and cleanup outcome
    pub async fn run_with_report(
        &self,
        request: &ExtractRequest,
    ) -> (Result<ExtractionResult, ExtractError>, RunReport) {
        let started = Instant::now();
        let target = request.target().resolve().to_string();
        let mut trail = StateTrail::new(target.clone());

        let acquired = SessionHandle::acquire(self.backend.as_ref(), &self.session).await;
        let mut session = match acquired {
            Ok(session) => session,
            Err(source) => {
                warn!(%target, "browser launch failed: {source}");
                let report = RunReport {
                    target: target.clone(),
                    session_id: None,
                    states: trail.into_history(),
                    records: 0,
                    elapsed: started.elapsed(),
                    cleanup: None,
                };
                return (Err(ExtractError::Launch { target, source }), report);
            }
        };
        trail.advance(PipelineState::SessionAcquired);

        let outcome = self.drive(&mut session, request, &target, &mut trail).await;

        let cleanup = session.release().await;
        trail.advance(PipelineState::Released);

        let elapsed = started.elapsed();
        let records = match &outcome {
            Ok(result) => result.len(),
            Err(e) => e.partial_result().map_or(0, ExtractionResult::len),
        };
        match &outcome {
            Ok(_) => info!(
                %target,
                records,
                elapsed_ms = elapsed.as_millis() as u64,
                "extraction finished"
            ),
            Err(e) => warn!(
                %target,
                stage = %e.stage(),
                elapsed_ms = elapsed.as_millis() as u64,
                "extraction failed: {e}"
            ),
        }

        let report = RunReport {
            target,
            session_id: Some(session.id()),
            states: trail.into_history(),
            records,
            elapsed,
            cleanup,
        };
        (outcome, report)
    }

    /// Everything between acquire and release
    async fn drive(
        &self,
        session: &mut SessionHandle,
        request: &ExtractRequest,
        target: &str,
        trail: &mut StateTrail,
    ) -> Result<ExtractionResult, ExtractError> {
        let work = self.navigate_and_extract(session, request, target, trail);

        let result = match request.run_timeout() {
            Some(limit) => match tokio::time::timeout(limit, work).await {
                Ok(outcome) => outcome?,
                Err(_) => {
                    return Err(ExtractError::Timeout {
                        target: target.to_string(),
                        elapsed: limit,
                    });
                }
            },
            None => work.await?,
        };

        if let Err(source) = emit_all(request, &result).await {
            return Err(ExtractError::Sink {
                target: target.to_string(),
                result: Box::new(result),
                source,
            });
        }
        trail.advance(PipelineState::Emitted);

        Ok(result)
    }

    async fn navigate_and_extract(
        &self,
        session: &mut SessionHandle,
        request: &ExtractRequest,
        target: &str,
        trail: &mut StateTrail,
    ) -> Result<ExtractionResult, ExtractError> {
        navigate(
            session,
            request.target(),
            request.readiness(),
            self.session.timeout(),
        )
        .await?;
        trail.advance(PipelineState::Navigated);

        let extraction_error = |source: StrategyError| ExtractError::Extraction {
            target: target.to_string(),
            source,
        };

        let driver = session.driver_mut().ok_or_else(|| {
            extraction_error(StrategyError::Other("session was already released".into()))
        })?;
        let snapshot = driver.snapshot().await.map_err(|e| {
            extraction_error(StrategyError::Other(format!("failed to capture page: {e:#}")))
        })?;
        debug!(%target, bytes = snapshot.html.len(), "page captured");

        let strategy = Arc::clone(&request.strategy);
        let name = strategy.name().to_string();
        let result = tokio::task::spawn_blocking(move || run_strategy(strategy.as_ref(), &snapshot))
            .await
            .map_err(|_| extraction_error(StrategyError::Aborted(name)))?
            .map_err(extraction_error)?;
        trail.advance(PipelineState::Extracted);

        Ok(result)
    }
}

/// Hand the result to every sink, including the file sink implied by
/// `output_path`. All sinks are attempted; the first failure is returned.
async fn emit_all(
    request: &ExtractRequest,
    result: &ExtractionResult,
) -> Result<(), crate::errors::SinkError> {
    let file_sink = request
        .output_path()
        .map(|path| Arc::new(JsonFileSink::new(path)) as Arc<dyn ResultSink>);

    let mut first_error = None;
    for sink in request.sinks.iter().chain(file_sink.iter()) {
        match sink.emit(result).await {
            Ok(()) => debug!(sink = sink.name(), "result emitted"),
            Err(e) => {
                warn!(sink = sink.name(), "sink failed: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
