//! In-process browser backend for exercising the pipeline without Chromium
//!
//! [`FixtureBackend`] serves fixed HTML, reports readiness on demand, and
//! can be told to fail at any step. Every launch and close is counted in a
//! shared [`SessionCounters`].

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

use crate::config::SessionConfig;
use crate::navigation::ReadinessProbe;
use crate::session::{BrowserBackend, CleanupReport, PageDriver};
use crate::strategy::PageSnapshot;

/// Step a fixture session should fail at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fault {
    Launch,
    Navigate,
    /// Navigation succeeds but the DOM never reports as loaded
    NeverReady,
    Snapshot,
    /// Close reports a partial failure
    Close,
}

/// Launch and close bookkeeping shared by all sessions of a backend
#[derive(Debug, Default)]
pub struct SessionCounters {
    launched: AtomicUsize,
    close_calls: AtomicUsize,
    launch_attempts: AtomicUsize,
}

impl SessionCounters {
    /// Sessions that started successfully
    #[must_use]
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    /// Calls that reached a driver's `close`
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn launch_attempts(&self) -> usize {
        self.launch_attempts.load(Ordering::SeqCst)
    }

    /// Sessions started but not yet closed
    #[must_use]
    pub fn live(&self) -> usize {
        self.launched().saturating_sub(self.close_calls())
    }
}

/// Serves one HTML document for any URL
#[derive(Debug, Clone)]
pub struct FixtureBackend {
    html: String,
    final_url: Option<String>,
    faults: HashSet<Fault>,
    in_flight: Vec<usize>,
    launch_delay: Duration,
    counters: Arc<SessionCounters>,
}

impl FixtureBackend {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            final_url: None,
            faults: HashSet::new(),
            in_flight: Vec::new(),
            launch_delay: Duration::ZERO,
            counters: Arc::new(SessionCounters::default()),
        }
    }

    #[must_use]
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.insert(fault);
        self
    }

    /// URL reported by snapshots instead of the navigated one, as after a redirect
    #[must_use]
    pub fn with_final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }

    /// In-flight request counts returned by successive probes; the last value
    /// repeats. Empty means always zero.
    #[must_use]
    pub fn with_in_flight(mut self, counts: impl IntoIterator<Item = usize>) -> Self {
        self.in_flight = counts.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = delay;
        self
    }

    /// Counters shared with every session this backend launches
    #[must_use]
    pub fn counters(&self) -> Arc<SessionCounters> {
        Arc::clone(&self.counters)
    }
}

#[async_trait]
impl BrowserBackend for FixtureBackend {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn launch(&self, _config: &SessionConfig) -> Result<Box<dyn PageDriver>> {
        self.counters.launch_attempts.fetch_add(1, Ordering::SeqCst);
        if !self.launch_delay.is_zero() {
            tokio::time::sleep(self.launch_delay).await;
        }
        if self.faults.contains(&Fault::Launch) {
            bail!("fixture browser refused to start");
        }
        self.counters.launched.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(FixturePage {
            backend: self.clone(),
            navigated: None,
            in_flight: self.in_flight.iter().copied().collect(),
            closed: false,
        }))
    }
}

struct FixturePage {
    backend: FixtureBackend,
    navigated: Option<Url>,
    in_flight: VecDeque<usize>,
    closed: bool,
}

impl FixturePage {
    fn fails_at(&self, fault: Fault) -> bool {
        self.backend.faults.contains(&fault)
    }

    fn next_in_flight(&mut self) -> usize {
        if self.in_flight.len() > 1 {
            self.in_flight.pop_front().unwrap_or(0)
        } else {
            self.in_flight.front().copied().unwrap_or(0)
        }
    }
}

#[async_trait]
impl PageDriver for FixturePage {
    async fn navigate(&mut self, url: &Url) -> Result<()> {
        if self.closed {
            bail!("page closed");
        }
        if self.fails_at(Fault::Navigate) {
            bail!("net::ERR_NAME_NOT_RESOLVED at {url}");
        }
        self.navigated = Some(url.clone());
        Ok(())
    }

    async fn probe(&mut self) -> Result<ReadinessProbe> {
        let in_flight = self.next_in_flight();
        Ok(ReadinessProbe {
            dom_content_loaded: self.navigated.is_some() && !self.fails_at(Fault::NeverReady),
            in_flight,
        })
    }

    async fn snapshot(&mut self) -> Result<PageSnapshot> {
        if self.fails_at(Fault::Snapshot) {
            bail!("target crashed");
        }
        let url = match (&self.backend.final_url, &self.navigated) {
            (Some(url), _) => url.clone(),
            (None, Some(url)) => url.to_string(),
            (None, None) => "about:blank".to_string(),
        };
        Ok(PageSnapshot::new(url, self.backend.html.clone()))
    }

    async fn close(&mut self) -> CleanupReport {
        self.backend
            .counters
            .close_calls
            .fetch_add(1, Ordering::SeqCst);
        self.closed = true;
        if self.fails_at(Fault::Close) {
            CleanupReport::PartialFailure(vec!["fixture browser ignored close".into()])
        } else {
            CleanupReport::Success
        }
    }
}
