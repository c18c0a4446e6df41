//! Run state machine

use std::fmt;
use tracing::debug;

/// Stage a run has reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    SessionAcquired,
    Navigated,
    Extracted,
    Emitted,
    Released,
}

impl PipelineState {
    /// Whether `next` may follow `self`.
    ///
    /// Forward steps go one at a time. Any state holding a session may jump
    /// straight to `Released` on failure. A failed launch ends in `Idle`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, SessionAcquired)
                | (SessionAcquired, Navigated)
                | (Navigated, Extracted)
                | (Extracted, Emitted)
                | (SessionAcquired | Navigated | Extracted | Emitted, Released)
        )
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Released
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::SessionAcquired => "session-acquired",
            Self::Navigated => "navigated",
            Self::Extracted => "extracted",
            Self::Emitted => "emitted",
            Self::Released => "released",
        };
        f.write_str(name)
    }
}

/// Sequence of states one run went through
#[derive(Debug, Clone)]
pub(crate) struct StateTrail {
    target: String,
    history: Vec<PipelineState>,
}

impl StateTrail {
    pub(crate) fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            history: vec![PipelineState::Idle],
        }
    }

    pub(crate) fn current(&self) -> PipelineState {
        self.history
            .last()
            .copied()
            .unwrap_or(PipelineState::Idle)
    }

    pub(crate) fn advance(&mut self, next: PipelineState) {
        let current = self.current();
        debug_assert!(
            current.can_advance_to(next),
            "illegal pipeline transition {current} -> {next}"
        );
        debug!(target = %self.target, from = %current, to = %next, "pipeline transition");
        self.history.push(next);
    }

    pub(crate) fn into_history(self) -> Vec<PipelineState> {
        self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn happy_path_is_linear() {
        let path = [Idle, SessionAcquired, Navigated, Extracted, Emitted, Released];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn error_path_releases_from_any_live_state() {
        for state in [SessionAcquired, Navigated, Extracted, Emitted] {
            assert!(state.can_advance_to(Released));
        }
        assert!(!Idle.can_advance_to(Released));
        assert!(!Released.can_advance_to(Released));
        assert!(!SessionAcquired.can_advance_to(Extracted));
    }

    #[test]
    fn trail_records_history() {
        let mut trail = StateTrail::new("https://a.test/");
        trail.advance(SessionAcquired);
        trail.advance(Released);
        assert!(trail.current().is_terminal());
        assert_eq!(trail.into_history(), vec![Idle, SessionAcquired, Released]);
    }
}
