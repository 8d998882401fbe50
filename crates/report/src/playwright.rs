//! Playwright JSON reporter document
//!
//! Only the fields the report reads are modelled. Every field is optional or
//! defaulted so partial documents still deserialize.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};

/// Root of `npx playwright test --reporter=json` output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightReport {
    pub config: Option<RunConfig>,
    pub suites: Vec<Suite>,
    pub stats: Option<RunStats>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    #[serde(rename = "use")]
    pub use_options: Option<UseOptions>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: Option<String>,
    #[serde(rename = "use")]
    pub use_options: Option<UseOptions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UseOptions {
    #[serde(rename = "baseURL")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunStats {
    pub start_time: Option<String>,
}

/// A `describe` block or a test file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Suite {
    pub title: Option<String>,
    pub file: Option<String>,
    pub suites: Vec<Suite>,
    pub specs: Vec<Spec>,
}

/// A single `test(...)` declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Spec {
    pub title: Option<String>,
    pub file: Option<String>,
    pub tests: Vec<ProjectTest>,
}

/// One spec executed under one project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectTest {
    pub project_name: Option<String>,
    pub status: Option<String>,
    pub results: Vec<TestAttempt>,
}

/// One attempt of a test; retries append further attempts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestAttempt {
    pub status: Option<String>,
    pub error: Option<TestError>,
    pub errors: Vec<TestError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestError {
    pub message: Option<String>,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

impl PlaywrightReport {
    /// Parse a report from a JSON string
    pub fn from_json(json: &str) -> ReportResult<Self> {
        serde_json::from_str(json).map_err(ReportError::from)
    }

    /// Parse a report from a file, failing with `InputNotFound` if absent
    pub fn from_file(path: &Path) -> ReportResult<Self> {
        if !path.exists() {
            return Err(ReportError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Base URL from `config.use`, falling back to the first project's `use`
    pub fn base_url(&self) -> Option<&str> {
        let config = self.config.as_ref()?;
        config
            .use_options
            .as_ref()
            .and_then(|u| non_empty(u.base_url.as_ref()))
            .or_else(|| {
                config
                    .projects
                    .first()
                    .and_then(|p| p.use_options.as_ref())
                    .and_then(|u| non_empty(u.base_url.as_ref()))
            })
    }

    pub fn start_time(&self) -> Option<&str> {
        self.stats
            .as_ref()
            .and_then(|s| non_empty(s.start_time.as_ref()))
    }
}

impl TestAttempt {
    /// Single-line error text: `error.message`, else the first populated
    /// entry of `errors`, else empty.
    pub fn error_message(&self) -> String {
        let primary = self
            .error
            .as_ref()
            .and_then(|e| non_empty(e.message.as_ref()));
        let message = primary.or_else(|| {
            self.errors
                .iter()
                .find_map(|e| non_empty(e.message.as_ref()))
        });
        message.map(crate::text::single_line).unwrap_or_default()
    }
}
