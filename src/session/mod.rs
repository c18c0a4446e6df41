//! Browser sessions
//!
//! A [`SessionHandle`] owns one browser process and one page for the
//! duration of a single run. Launching and page control sit behind the
//! [`BrowserBackend`] and [`PageDriver`] traits so the pipeline can be driven
//! by a live Chromium or by an in-process fixture.

pub mod chrome;
pub mod cleanup;
pub mod network;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::config::SessionConfig;
use crate::errors::LaunchError;
use crate::navigation::ReadinessProbe;
use crate::strategy::PageSnapshot;

pub use chrome::{ChromeBackend, ChromeSession};
pub use cleanup::CleanupReport;
pub use network::NetworkTracker;

/// Starts browser processes
#[async_trait]
pub trait BrowserBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Start a browser and open one blank page in it
    async fn launch(&self, config: &SessionConfig) -> Result<Box<dyn PageDriver>>;
}

/// Controls the single page of a launched browser
#[async_trait]
pub trait PageDriver: Send {
    /// Start loading `url`. Returns once the browser accepted the navigation;
    /// a load error reported by the browser is an `Err`.
    async fn navigate(&mut self, url: &Url) -> Result<()>;

    /// Current readiness state of the navigated document
    async fn probe(&mut self) -> Result<ReadinessProbe>;

    /// Serialized DOM plus the page's current URL
    async fn snapshot(&mut self) -> Result<PageSnapshot>;

    /// Tear the page, browser and any helper tasks down.
    ///
    /// Must not fail; problems go into the report.
    async fn close(&mut self) -> CleanupReport;
}

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Exclusive handle on one live browser session.
///
/// [`release`](Self::release) may be called any number of times; only the
/// first call closes the browser. A handle dropped without release still
/// tears the process down through the driver's own `Drop`, with a warning.
pub struct SessionHandle {
    id: u64,
    driver: Option<Box<dyn PageDriver>>,
    acquired_at: Instant,
}

impl SessionHandle {
    /// Launch a browser through `backend`, bounded by `config.timeout_ms`
    pub async fn acquire(
        backend: &dyn BrowserBackend,
        config: &SessionConfig,
    ) -> Result<Self, LaunchError> {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        debug!(
            session = id,
            backend = backend.name(),
            headless = config.headless,
            "acquiring browser session"
        );

        let driver = match tokio::time::timeout(config.timeout(), backend.launch(config)).await {
            Ok(Ok(driver)) => driver,
            Ok(Err(e)) => return Err(LaunchError::from(e)),
            Err(_) => {
                return Err(LaunchError::new(format!(
                    "browser did not start within {} ms",
                    config.timeout_ms
                )));
            }
        };

        Ok(Self {
            id,
            driver: Some(driver),
            acquired_at: Instant::now(),
        })
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.driver.is_none()
    }

    /// Driver of a live session, `None` once released
    pub fn driver_mut(&mut self) -> Option<&mut (dyn PageDriver + 'static)> {
        self.driver.as_deref_mut()
    }

    /// Close the session. Later calls do nothing and return `None`.
    pub async fn release(&mut self) -> Option<CleanupReport> {
        let mut driver = self.driver.take()?;
        let report = driver.close().await;
        report.log(self.id);
        debug!(
            session = self.id,
            held_ms = self.acquired_at.elapsed().as_millis() as u64,
            "browser session released"
        );
        Some(report)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.driver.is_some() {
            warn!(
                session = self.id,
                "session dropped without release; relying on driver drop to stop the browser"
            );
        }
    }
}
