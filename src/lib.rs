//! Single-page web extraction on top of a headless Chromium.
//!
//! A run launches a private browser session, loads one target (a URL or a
//! search query), waits for the page to become ready, reads records out of
//! the rendered DOM with an [`ExtractionStrategy`], hands the result to any
//! configured sinks, and always tears the browser down again.
//!
//! ```no_run
//! use webextract::{ExtractRequest, ListingStrategy, Target};
//!
//! # async fn demo() -> Result<(), webextract::ExtractError> {
//! let request = ExtractRequest::builder()
//!     .target(Target::url("https://blog.example.com")?)
//!     .strategy(ListingStrategy::default())
//!     .output_path("articles.json")
//!     .build()?;
//!
//! let result = webextract::extract(&request).await?;
//! println!("{} articles", result.len());
//! # Ok(())
//! # }
//! ```

pub mod browser_setup;
pub mod config;
pub mod errors;
pub mod navigation;
pub mod pipeline;
pub mod session;
pub mod sink;
pub mod strategy;
pub mod testing;
pub mod types;
pub mod utils;

pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::{ExtractRequest, ExtractSettings, SessionConfig};
pub use errors::{
    ExtractError, ExtractResult, LaunchError, NavigationError, SinkError, Stage, StrategyError,
};
pub use navigation::{
    NavigationReport, ReadinessCondition, ReadinessProbe, SearchProvider, Target, TargetMode,
    navigate,
};
pub use pipeline::{
    ExtractionPipeline, PipelineState, RetryPolicy, RunReport, retry_with_backoff,
};
pub use session::{BrowserBackend, ChromeBackend, CleanupReport, PageDriver, SessionHandle};
pub use sink::{CallbackSink, ConsoleSink, JsonFileSink, MemorySink, ResultSink, read_result};
pub use strategy::{
    ExtractionStrategy, ListingStrategy, PageDocument, PageSnapshot, SearchResultStrategy,
    SearchSelectors, StrategyName, run_strategy,
};
pub use types::{ExtractedRecord, ExtractionResult};

/// Run `request` in a local Chromium configured from the environment.
///
/// Browser options and the query base URL come from
/// [`ExtractSettings::from_env`]; use [`ExtractionPipeline`] directly for
/// explicit configuration.
pub async fn extract(request: &ExtractRequest) -> ExtractResult<ExtractionResult> {
    let settings = ExtractSettings::from_env()?;
    let request = settings.apply_to_request(request);
    ExtractionPipeline::chromium(settings.session)
        .run(&request)
        .await
}
