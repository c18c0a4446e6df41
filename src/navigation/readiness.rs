//! Page readiness conditions
//!
//! A condition is evaluated against successive [`ReadinessProbe`]s taken
//! from the live page; extraction may only start once it holds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use super::target::Target;
use crate::utils::NETWORK_IDLE_QUIET_WINDOW_MS;

/// When a loaded page is stable enough to read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadinessCondition {
    /// The navigated document has been parsed
    #[default]
    DomContentLoaded,

    /// DOM content is loaded and at most `max_in_flight` requests have been
    /// pending for `quiet_window_ms` without interruption
    NetworkIdle {
        max_in_flight: usize,
        quiet_window_ms: u64,
    },
}

impl ReadinessCondition {
    /// `networkidle0`: no requests in flight for 500 ms
    #[must_use]
    pub fn network_idle0() -> Self {
        Self::NetworkIdle {
            max_in_flight: 0,
            quiet_window_ms: NETWORK_IDLE_QUIET_WINDOW_MS,
        }
    }

    /// `networkidle2`: at most two requests in flight for 500 ms
    #[must_use]
    pub fn network_idle2() -> Self {
        Self::NetworkIdle {
            max_in_flight: 2,
            quiet_window_ms: NETWORK_IDLE_QUIET_WINDOW_MS,
        }
    }

    /// Search result pages render through script, so queries wait for the
    /// network; plain pages only need their DOM.
    #[must_use]
    pub fn default_for(target: &Target) -> Self {
        match target {
            Target::Query { .. } => Self::network_idle2(),
            Target::Url(_) => Self::DomContentLoaded,
        }
    }
}

impl fmt::Display for ReadinessCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomContentLoaded => f.write_str("domcontentloaded"),
            Self::NetworkIdle {
                max_in_flight,
                quiet_window_ms,
            } => write!(f, "networkidle:{max_in_flight}:{quiet_window_ms}"),
        }
    }
}

impl FromStr for ReadinessCondition {
    type Err = String;

    /// Accepts `domcontentloaded`, `networkidle0`, `networkidle2` and
    /// `networkidle:<max_in_flight>:<quiet_window_ms>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "domcontentloaded" | "dom" => return Ok(Self::DomContentLoaded),
            "networkidle0" => return Ok(Self::network_idle0()),
            "networkidle2" | "networkidle" => return Ok(Self::network_idle2()),
            _ => {}
        }

        let Some(rest) = normalized.strip_prefix("networkidle:") else {
            return Err(format!(
                "unknown readiness condition '{s}' (expected domcontentloaded, networkidle0, \
                 networkidle2 or networkidle:<max>:<ms>)"
            ));
        };

        let (max, window) = rest
            .split_once(':')
            .ok_or_else(|| format!("expected networkidle:<max>:<ms>, got '{s}'"))?;
        let max_in_flight = max
            .parse::<usize>()
            .map_err(|e| format!("bad in-flight limit '{max}': {e}"))?;
        let quiet_window_ms = window
            .parse::<u64>()
            .map_err(|e| format!("bad quiet window '{window}': {e}"))?;

        Ok(Self::NetworkIdle {
            max_in_flight,
            quiet_window_ms,
        })
    }
}

/// Point-in-time page state used to evaluate a [`ReadinessCondition`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadinessProbe {
    /// The navigated document reached `interactive` or `complete`
    pub dom_content_loaded: bool,
    /// Network requests issued by the page that have not finished yet
    pub in_flight: usize,
}

/// Folds successive probes into a yes/no answer.
///
/// Network idleness needs history: the in-flight count must stay under the
/// limit for the whole quiet window, so any probe above the limit restarts
/// the window.
#[derive(Debug)]
pub(crate) struct ReadinessTracker {
    condition: ReadinessCondition,
    quiet_since: Option<Instant>,
}

impl ReadinessTracker {
    pub(crate) fn new(condition: ReadinessCondition) -> Self {
        Self {
            condition,
            quiet_since: None,
        }
    }

    pub(crate) fn observe(&mut self, probe: ReadinessProbe, now: Instant) -> bool {
        match self.condition {
            ReadinessCondition::DomContentLoaded => probe.dom_content_loaded,
            ReadinessCondition::NetworkIdle {
                max_in_flight,
                quiet_window_ms,
            } => {
                if !probe.dom_content_loaded || probe.in_flight > max_in_flight {
                    self.quiet_since = None;
                    return false;
                }
                let since = *self.quiet_since.get_or_insert(now);
                now.duration_since(since) >= Duration::from_millis(quiet_window_ms)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(dom: bool, in_flight: usize) -> ReadinessProbe {
        ReadinessProbe {
            dom_content_loaded: dom,
            in_flight,
        }
    }

    #[test]
    fn dom_content_loaded_only_needs_the_dom() {
        let mut tracker = ReadinessTracker::new(ReadinessCondition::DomContentLoaded);
        let now = Instant::now();
        assert!(!tracker.observe(probe(false, 0), now));
        assert!(tracker.observe(probe(true, 40), now));
    }

    #[test]
    fn network_idle_requires_full_quiet_window() {
        let mut tracker = ReadinessTracker::new(ReadinessCondition::NetworkIdle {
            max_in_flight: 2,
            quiet_window_ms: 500,
        });
        let t0 = Instant::now();
        let ms = |n| t0 + Duration::from_millis(n);

        assert!(!tracker.observe(probe(true, 2), ms(0)));
        assert!(!tracker.observe(probe(true, 1), ms(300)));
        // burst above the limit restarts the window
        assert!(!tracker.observe(probe(true, 3), ms(400)));
        assert!(!tracker.observe(probe(true, 0), ms(450)));
        assert!(!tracker.observe(probe(true, 0), ms(900)));
        assert!(tracker.observe(probe(true, 2), ms(950)));
    }

    #[test]
    fn network_idle_waits_for_dom() {
        let mut tracker = ReadinessTracker::new(ReadinessCondition::network_idle0());
        let t0 = Instant::now();
        assert!(!tracker.observe(probe(false, 0), t0));
        assert!(!tracker.observe(probe(false, 0), t0 + Duration::from_secs(5)));
        assert!(!tracker.observe(probe(true, 0), t0 + Duration::from_secs(6)));
        assert!(tracker.observe(probe(true, 0), t0 + Duration::from_millis(6500)));
    }

    #[test]
    fn textual_forms_parse() {
        assert_eq!(
            "domcontentloaded".parse::<ReadinessCondition>().unwrap(),
            ReadinessCondition::DomContentLoaded
        );
        assert_eq!(
            "networkidle2".parse::<ReadinessCondition>().unwrap(),
            ReadinessCondition::network_idle2()
        );
        assert_eq!(
            "networkidle:1:250".parse::<ReadinessCondition>().unwrap(),
            ReadinessCondition::NetworkIdle {
                max_in_flight: 1,
                quiet_window_ms: 250
            }
        );
        assert!("networkidle:x:1".parse::<ReadinessCondition>().is_err());
        assert!("load".parse::<ReadinessCondition>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for cond in [
            ReadinessCondition::DomContentLoaded,
            ReadinessCondition::NetworkIdle {
                max_in_flight: 3,
                quiet_window_ms: 42,
            },
        ] {
            assert_eq!(cond.to_string().parse::<ReadinessCondition>().unwrap(), cond);
        }
    }
}
