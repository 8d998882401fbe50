//! Test outcome classification

/// Raw statuses that count as a failed test.
pub const FAILURE_STATUSES: [&str; 3] = ["failed", "timedOut", "interrupted"];

/// Reporting bucket for a raw Playwright status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Passed,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw status onto an [`Outcome`].
///
/// Anything unrecognized (including `"unknown"`) is reported as skipped so it
/// never inflates either the pass or the failure count.
pub fn classify_status(status: &str) -> Outcome {
    match status {
        "passed" => Outcome::Passed,
        "skipped" => Outcome::Skipped,
        s if FAILURE_STATUSES.contains(&s) => Outcome::Failed,
        _ => Outcome::Skipped,
    }
}
