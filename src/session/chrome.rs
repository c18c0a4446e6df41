//! Chromium implementation of the session traits

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::page::Page;
use log::{debug, warn};
use serde::Deserialize;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use url::Url;

use super::cleanup::CleanupReport;
use super::network::{self, NetworkTracker};
use super::{BrowserBackend, PageDriver};
use crate::browser_setup::{LaunchedBrowser, launch_browser};
use crate::config::SessionConfig;
use crate::navigation::ReadinessProbe;
use crate::strategy::PageSnapshot;

const READY_STATE_JS: &str =
    "(() => ({ state: document.readyState, href: location.href }))()";

/// Launches a local Chromium per session
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeBackend;

#[async_trait]
impl BrowserBackend for ChromeBackend {
    fn name(&self) -> &str {
        "chromium"
    }

    async fn launch(&self, config: &SessionConfig) -> Result<Box<dyn PageDriver>> {
        let LaunchedBrowser {
            browser,
            handler,
            profile_dir,
        } = launch_browser(config).await?;

        // From here on the session owns the process; a failure below still
        // goes through its teardown.
        let mut session = ChromeSession {
            browser,
            handler,
            profile_dir: Some(profile_dir),
            page: None,
            listeners: Vec::new(),
            tracker: NetworkTracker::new(),
            closed: false,
        };

        if let Err(e) = session.open_page().await {
            session.close().await.log(0);
            return Err(e);
        }

        Ok(Box::new(session))
    }
}

/// One Chromium process with a single page
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    profile_dir: Option<TempDir>,
    page: Option<Page>,
    listeners: Vec<JoinHandle<()>>,
    tracker: NetworkTracker,
    closed: bool,
}

#[derive(Deserialize)]
struct ReadyState {
    state: String,
    href: String,
}

impl ChromeSession {
    async fn open_page(&mut self) -> Result<()> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to create blank page")?;
        self.listeners = network::attach(&page, &self.tracker).await?;
        self.page = Some(page);
        Ok(())
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("browser page is not open"))
    }
}

#[async_trait]
impl PageDriver for ChromeSession {
    async fn navigate(&mut self, url: &Url) -> Result<()> {
        self.tracker.reset();
        let page = self.page()?;

        let response = page
            .execute(NavigateParams::new(url.as_str()))
            .await
            .with_context(|| format!("Page.navigate to {url} failed"))?;

        if let Some(error_text) = response.result.error_text.as_deref() {
            anyhow::bail!("failed to load {url}: {error_text}");
        }
        Ok(())
    }

    async fn probe(&mut self) -> Result<ReadinessProbe> {
        let in_flight = self.tracker.in_flight();
        let page = self.page()?;

        // The old document can still answer right after Page.navigate; it is
        // treated as not loaded.
        let dom_content_loaded = match page.evaluate(READY_STATE_JS).await {
            Ok(result) => match result.into_value::<ReadyState>() {
                Ok(ready) => ready.href != "about:blank" && ready.state != "loading",
                Err(_) => false,
            },
            Err(_) => false,
        };

        Ok(ReadinessProbe {
            dom_content_loaded,
            in_flight,
        })
    }

    async fn snapshot(&mut self) -> Result<PageSnapshot> {
        let page = self.page()?;
        let html = page.content().await.context("Failed to read page content")?;
        let url = page
            .url()
            .await
            .context("Failed to read page URL")?
            .unwrap_or_else(|| "about:blank".to_string());
        Ok(PageSnapshot::new(url, html))
    }

    async fn close(&mut self) -> CleanupReport {
        if self.closed {
            return CleanupReport::Success;
        }
        self.closed = true;

        let mut errors = Vec::new();

        for listener in self.listeners.drain(..) {
            listener.abort();
        }

        if let Some(page) = self.page.take()
            && let Err(e) = page.close().await
        {
            // The browser close below takes the page with it
            debug!(target: "webextract::cleanup", "Page close failed: {e}");
        }

        debug!(target: "webextract::cleanup", "Closing browser");
        if let Err(e) = self.browser.close().await {
            warn!(target: "webextract::cleanup", "Failed to close browser: {e}");
            errors.push(format!("Browser close failed: {e}"));
        }

        // Wait for the process to exit before removing its profile
        if let Err(e) = self.browser.wait().await {
            warn!(target: "webextract::cleanup", "Failed to wait for browser exit: {e}");
            errors.push(format!("Browser wait failed: {e}"));
        }

        self.handler.abort();

        if let Some(dir) = self.profile_dir.take() {
            let path = dir.path().display().to_string();
            if let Err(e) = dir.close() {
                warn!(target: "webextract::cleanup", "Failed to remove profile {path}: {e}");
                errors.push(format!("Profile cleanup failed: {e}"));
            }
        }

        CleanupReport::from_errors(errors)
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        for listener in &self.listeners {
            listener.abort();
        }
        self.handler.abort();
        // Browser::drop kills the child process; TempDir::drop removes the profile
    }
}
