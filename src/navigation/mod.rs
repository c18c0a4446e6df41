//! Driving a page to its target and waiting until it is ready to read

pub mod readiness;
pub mod target;

use std::time::{Duration, Instant};
use tracing::{debug, trace};
use url::Url;

use crate::errors::NavigationError;
use crate::session::{PageDriver, SessionHandle};
use crate::utils::READINESS_POLL_INTERVAL_MS;

pub use readiness::{ReadinessCondition, ReadinessProbe};
pub use target::{SearchProvider, Target, TargetMode};

use readiness::ReadinessTracker;

/// Where navigation ended up and how long it took
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationReport {
    pub url: Url,
    pub elapsed: Duration,
}

/// Load `target` in the session's page and wait for `readiness`.
///
/// Makes exactly one attempt. Both the load and the readiness wait count
/// against `timeout`.
pub async fn navigate(
    session: &mut SessionHandle,
    target: &Target,
    readiness: ReadinessCondition,
    timeout: Duration,
) -> Result<NavigationReport, NavigationError> {
    let started = Instant::now();
    let url = target.resolve();
    let fail = |reason: String| NavigationError {
        target: url.to_string(),
        elapsed: started.elapsed(),
        reason,
    };

    let Some(driver) = session.driver_mut() else {
        return Err(fail("session was already released".into()));
    };

    debug!(%url, %readiness, timeout_ms = timeout.as_millis() as u64, "navigating");

    let attempt = async {
        driver
            .navigate(&url)
            .await
            .map_err(|e| format!("page load failed: {e:#}"))?;
        wait_until_ready(driver, readiness).await
    };

    let outcome = tokio::time::timeout(timeout, attempt).await;
    match outcome {
        Ok(Ok(())) => {
            let elapsed = started.elapsed();
            debug!(%url, elapsed_ms = elapsed.as_millis() as u64, "page ready");
            Ok(NavigationReport { url, elapsed })
        }
        Ok(Err(reason)) => Err(fail(reason)),
        Err(_) => Err(fail(format!(
            "readiness condition {readiness} not met within {} ms",
            timeout.as_millis()
        ))),
    }
}

/// Poll the driver until `condition` holds. Runs until cancelled.
async fn wait_until_ready(
    driver: &mut dyn PageDriver,
    condition: ReadinessCondition,
) -> Result<(), String> {
    let mut tracker = ReadinessTracker::new(condition);
    let mut ticker = tokio::time::interval(Duration::from_millis(READINESS_POLL_INTERVAL_MS));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let probe = driver
            .probe()
            .await
            .map_err(|e| format!("readiness probe failed: {e:#}"))?;
        trace!(?probe, "readiness probe");
        if tracker.observe(probe, Instant::now()) {
            return Ok(());
        }
    }
}
