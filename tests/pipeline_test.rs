//! Pipeline lifecycle against the fixture backend

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use webextract::testing::{Fault, FixtureBackend};
use webextract::{
    CallbackSink, ExtractError, ExtractRequest, ExtractionPipeline, ExtractionResult,
    ExtractionStrategy, ListingStrategy, MemorySink, PageDocument, PipelineState,
    ReadinessCondition, SearchProvider, SearchResultStrategy, SessionHandle, Stage,
    StrategyError, Target, read_result,
};

fn listing_request(target: &str) -> ExtractRequest {
    ExtractRequest::builder()
        .target(Target::url(target).unwrap())
        .strategy(ListingStrategy::default())
        .build()
        .unwrap()
}

#[tokio::test]
async fn successful_run_walks_every_state_once() {
    let backend = FixtureBackend::new(common::listing_page());
    let counters = backend.counters();
    let pipeline = common::pipeline_for(&backend, 1_000);

    let memory = MemorySink::new();
    let request = ExtractRequest::builder()
        .target(Target::url("blog.example.com").unwrap())
        .strategy(ListingStrategy::default())
        .sink(memory.clone())
        .build()
        .unwrap();

    let (result, report) = pipeline.run_with_report(&request).await;
    let result = result.unwrap();

    assert_eq!(result.len(), 4);
    assert_eq!(result.page_title.as_deref(), Some("Engineering Blog"));
    assert_eq!(memory.take(), Some(result));
    assert_eq!(
        report.states,
        vec![
            PipelineState::Idle,
            PipelineState::SessionAcquired,
            PipelineState::Navigated,
            PipelineState::Extracted,
            PipelineState::Emitted,
            PipelineState::Released,
        ]
    );
    assert_eq!(report.records, 4);
    assert!(report.cleanup.as_ref().is_some_and(|c| c.is_success()));
    assert_eq!(counters.launched(), 1);
    assert_eq!(counters.close_calls(), 1);
}

#[tokio::test]
async fn query_target_uses_search_strategy_on_provider_page() {
    let backend = FixtureBackend::new(common::search_results_page());
    let pipeline = common::pipeline_for(&backend, 2_000);

    let request = ExtractRequest::builder()
        .target(Target::query("rust async", SearchProvider::Google).unwrap())
        .strategy(SearchResultStrategy::for_provider(SearchProvider::Google))
        .build()
        .unwrap();
    assert_eq!(request.readiness(), ReadinessCondition::network_idle2());

    let result = pipeline.run(&request).await.unwrap();
    assert_eq!(result.len(), 3);
}

#[tokio::test]
async fn readiness_timeout_fails_fast_and_releases() {
    let backend = FixtureBackend::new(common::listing_page()).with_fault(Fault::NeverReady);
    let counters = backend.counters();
    let pipeline = common::pipeline_for(&backend, 50);

    let started = Instant::now();
    let (result, report) = pipeline
        .run_with_report(&listing_request("https://blog.example.com/"))
        .await;
    let elapsed = started.elapsed();

    let err = result.unwrap_err();
    assert!(matches!(err, ExtractError::Navigation(_)), "{err}");
    assert_eq!(err.stage(), Stage::Navigation);
    assert_eq!(err.target(), Some("https://blog.example.com/"));
    assert!(elapsed <= Duration::from_millis(200), "took {elapsed:?}");
    assert_eq!(report.final_state(), PipelineState::Released);
    assert_eq!(counters.close_calls(), 1);
    assert_eq!(counters.live(), 0);
}

#[tokio::test]
async fn network_idle_waits_for_quiet_network() {
    // Two busy probes, then quiet; 25 ms polling plus a 100 ms window
    let backend = FixtureBackend::new(common::listing_page()).with_in_flight([5, 5, 0]);
    let pipeline = common::pipeline_for(&backend, 2_000);

    let request = ExtractRequest::builder()
        .target(Target::url("https://blog.example.com/").unwrap())
        .strategy(ListingStrategy::default())
        .readiness(ReadinessCondition::NetworkIdle {
            max_in_flight: 0,
            quiet_window_ms: 100,
        })
        .build()
        .unwrap();

    let started = Instant::now();
    pipeline.run(&request).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn load_failure_is_a_navigation_error() {
    let backend = FixtureBackend::new("").with_fault(Fault::Navigate);
    let counters = backend.counters();
    let pipeline = common::pipeline_for(&backend, 1_000);

    let err = pipeline
        .run(&listing_request("https://nowhere.invalid/"))
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(err.to_string().contains("ERR_NAME_NOT_RESOLVED"));
    assert_eq!(counters.close_calls(), 1);
}

#[tokio::test]
async fn launch_failure_skips_release() {
    let backend = FixtureBackend::new("").with_fault(Fault::Launch);
    let counters = backend.counters();
    let pipeline = common::pipeline_for(&backend, 1_000);

    let (result, report) = pipeline
        .run_with_report(&listing_request("https://blog.example.com/"))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, ExtractError::Launch { .. }));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(report.states, vec![PipelineState::Idle]);
    assert!(report.cleanup.is_none());
    assert_eq!(counters.close_calls(), 0);
}

#[tokio::test]
async fn slow_launch_is_a_launch_error() {
    let backend =
        FixtureBackend::new("").with_launch_delay(Duration::from_millis(500));
    let pipeline = common::pipeline_for(&backend, 50);

    let err = pipeline
        .run(&listing_request("https://blog.example.com/"))
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractError::Launch { .. }), "{err}");
}

#[tokio::test]
async fn sink_failure_keeps_computed_result() {
    let backend = FixtureBackend::new(common::listing_page());
    let counters = backend.counters();
    let pipeline = common::pipeline_for(&backend, 1_000);

    let memory = MemorySink::new();
    let request = ExtractRequest::builder()
        .target(Target::url("https://blog.example.com/").unwrap())
        .strategy(ListingStrategy::default())
        .sink(CallbackSink::new(|_| Err("quota exceeded".into())))
        .sink(memory.clone())
        .build()
        .unwrap();

    let (result, report) = pipeline.run_with_report(&request).await;
    let err = result.unwrap_err();

    assert_eq!(err.stage(), Stage::Sink);
    assert_eq!(err.partial_result().map(ExtractionResult::len), Some(4));
    // Later sinks still receive the result
    assert_eq!(memory.take().map(|r| r.len()), Some(4));
    assert_eq!(report.final_state(), PipelineState::Released);
    assert_eq!(counters.close_calls(), 1);
    assert_eq!(err.into_result().map(|r| r.len()), Some(4));
}

#[tokio::test]
async fn output_path_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("articles.json");
    let backend = FixtureBackend::new(common::listing_page());
    let pipeline = common::pipeline_for(&backend, 1_000);

    let request = ExtractRequest::builder()
        .target(Target::url("https://blog.example.com/").unwrap())
        .strategy(ListingStrategy::default())
        .output_path(&path)
        .build()
        .unwrap();

    let result = pipeline.run(&request).await.unwrap();
    assert_eq!(read_result(&path).await.unwrap(), result);
}

struct SlowStrategy;

impl ExtractionStrategy for SlowStrategy {
    fn name(&self) -> &str {
        "slow"
    }

    fn read_records(
        &self,
        _page: &PageDocument,
    ) -> Result<Vec<webextract::ExtractedRecord>, StrategyError> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn run_timeout_releases_and_reports_timeout() {
    let backend = FixtureBackend::new(common::listing_page());
    let counters = backend.counters();
    let pipeline = common::pipeline_for(&backend, 1_000);

    let request = ExtractRequest::builder()
        .target(Target::url("https://blog.example.com/").unwrap())
        .strategy(SlowStrategy)
        .run_timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = pipeline.run(&request).await.unwrap_err();
    assert!(matches!(err, ExtractError::Timeout { .. }), "{err}");
    assert!(err.is_retryable());
    assert_eq!(counters.close_calls(), 1);
}

struct PanickingStrategy;

impl ExtractionStrategy for PanickingStrategy {
    fn name(&self) -> &str {
        "panicking"
    }

    fn read_records(
        &self,
        _page: &PageDocument,
    ) -> Result<Vec<webextract::ExtractedRecord>, StrategyError> {
        panic!("selector engine exploded");
    }
}

#[tokio::test]
async fn strategy_panic_is_an_extraction_error() {
    let backend = FixtureBackend::new(common::listing_page());
    let counters = backend.counters();
    let pipeline = common::pipeline_for(&backend, 1_000);

    let request = ExtractRequest::builder()
        .target(Target::url("https://blog.example.com/").unwrap())
        .strategy(PanickingStrategy)
        .build()
        .unwrap();

    let err = pipeline.run(&request).await.unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Extraction {
            source: StrategyError::Aborted(ref name),
            ..
        } if name == "panicking"
    ));
    assert_eq!(counters.close_calls(), 1);
}

#[tokio::test]
async fn double_release_closes_once() {
    let backend = FixtureBackend::new("");
    let counters = backend.counters();
    let config = common::quick_session(1_000);

    let mut session = SessionHandle::acquire(&backend, &config).await.unwrap();
    assert!(session.release().await.is_some());
    assert!(session.release().await.is_none());
    assert!(session.is_released());
    assert_eq!(counters.close_calls(), 1);
}

#[tokio::test]
async fn close_failures_are_reported_not_raised() {
    let backend = FixtureBackend::new(common::listing_page()).with_fault(Fault::Close);
    let pipeline = common::pipeline_for(&backend, 1_000);

    let (result, report) = pipeline
        .run_with_report(&listing_request("https://blog.example.com/"))
        .await;

    assert!(result.is_ok());
    assert!(report.cleanup.as_ref().is_some_and(|c| !c.is_success()));
}

#[tokio::test]
async fn concurrent_runs_use_independent_sessions() {
    let backend = FixtureBackend::new(common::listing_page());
    let counters = backend.counters();
    let pipeline = ExtractionPipeline::new(Arc::new(backend), common::quick_session(1_000));

    let runs = (0..8).map(|_| {
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            pipeline
                .run_with_report(&listing_request("https://blog.example.com/"))
                .await
        })
    });

    let mut session_ids = Vec::new();
    for run in runs.collect::<Vec<_>>() {
        let (result, report) = run.await.unwrap();
        assert_eq!(result.unwrap().len(), 4);
        session_ids.push(report.session_id.unwrap());
    }
    session_ids.sort_unstable();
    session_ids.dedup();

    assert_eq!(session_ids.len(), 8);
    assert_eq!(counters.launched(), 8);
    assert_eq!(counters.close_calls(), 8);
}
