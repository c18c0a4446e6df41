//! Outcome of tearing a browser session down

use log::{debug, warn};

/// Result of cleanup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupReport {
    /// All cleanup operations succeeded
    Success,
    /// Some cleanup operations failed, with error details
    PartialFailure(Vec<String>),
}

impl CleanupReport {
    /// Build a report from the failures collected during teardown
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        if errors.is_empty() {
            Self::Success
        } else {
            Self::PartialFailure(errors)
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Log the report for `session_id`. Failures are never surfaced further.
    pub fn log(&self, session_id: u64) {
        match self {
            Self::Success => {
                debug!(target: "webextract::cleanup", "session {session_id} released cleanly");
            }
            Self::PartialFailure(errors) => {
                for error in errors {
                    warn!(target: "webextract::cleanup", "session {session_id}: {error}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_errors_is_success() {
        assert!(CleanupReport::from_errors(Vec::new()).is_success());
        let report = CleanupReport::from_errors(vec!["browser wait failed".into()]);
        assert_eq!(
            report,
            CleanupReport::PartialFailure(vec!["browser wait failed".into()])
        );
    }
}
