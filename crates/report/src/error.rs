//! Error types for report generation

use std::path::PathBuf;
use thiserror::Error;

/// Command that produces the Playwright JSON report this crate consumes.
pub const PRODUCE_REPORT_HINT: &str = "npx playwright test --reporter=json > test-results.json";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Test results not found at {}. Run `{}` first.", .path.display(), PRODUCE_REPORT_HINT)]
    InputNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
