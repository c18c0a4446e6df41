//! In-flight request accounting from CDP network events

use anyhow::{Context, Result};
use chromiumoxide_cdp::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Set of request ids the page has issued but not yet finished.
///
/// Cheap to clone; all clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct NetworkTracker {
    pending: Arc<Mutex<HashSet<String>>>,
}

impl NetworkTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Redirects reuse their request id, so a repeated start is a no-op.
    pub fn started(&self, request_id: &str) {
        self.pending.lock().insert(request_id.to_string());
    }

    pub fn finished(&self, request_id: &str) {
        self.pending.lock().remove(request_id);
    }

    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.pending.lock().len()
    }

    /// Forget everything; called before each navigation.
    pub fn reset(&self) {
        self.pending.lock().clear();
    }
}

/// Subscribe `tracker` to the page's network events and enable the domain.
///
/// The returned tasks run until aborted or the page goes away.
pub(crate) async fn attach(page: &Page, tracker: &NetworkTracker) -> Result<Vec<JoinHandle<()>>> {
    let mut sent = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .context("Failed to listen for requestWillBeSent")?;
    let mut finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .context("Failed to listen for loadingFinished")?;
    let mut failed = page
        .event_listener::<EventLoadingFailed>()
        .await
        .context("Failed to listen for loadingFailed")?;

    let mut tasks = Vec::with_capacity(3);

    let t = tracker.clone();
    tasks.push(tokio::spawn(async move {
        while let Some(event) = sent.next().await {
            t.started(event.request_id.inner());
        }
        trace!("requestWillBeSent stream ended");
    }));

    let t = tracker.clone();
    tasks.push(tokio::spawn(async move {
        while let Some(event) = finished.next().await {
            t.finished(event.request_id.inner());
        }
    }));

    let t = tracker.clone();
    tasks.push(tokio::spawn(async move {
        while let Some(event) = failed.next().await {
            t.finished(event.request_id.inner());
        }
    }));

    if let Err(e) = page.execute(EnableParams::default()).await {
        for task in &tasks {
            task.abort();
        }
        return Err(anyhow::anyhow!("Failed to enable network domain: {e}"));
    }

    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_distinct_pending_requests() {
        let tracker = NetworkTracker::new();
        let shared = tracker.clone();

        tracker.started("1");
        tracker.started("2");
        tracker.started("2");
        assert_eq!(shared.in_flight(), 2);

        shared.finished("1");
        shared.finished("unknown");
        assert_eq!(tracker.in_flight(), 1);

        tracker.reset();
        assert_eq!(tracker.in_flight(), 0);
    }
}
