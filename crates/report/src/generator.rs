//! Report generation driver: load inputs, render, write artifacts

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{categories_for_display, Summary};
use crate::collect::collect_records;
use crate::error::ReportResult;
use crate::known_issues::{KnownIssueIndex, KnownIssues};
use crate::playwright::PlaywrightReport;
use crate::render::{failure_notes, FailureNote, MarkdownReport, ReportContext, NOT_AVAILABLE};

/// Configuration for a report run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Playwright JSON reporter output
    pub input: PathBuf,

    /// Known-issues ledger (JSON, or YAML by extension)
    pub known_issues: PathBuf,

    /// Markdown destination
    pub output: PathBuf,

    /// Optional machine-readable summary destination
    #[serde(default)]
    pub summary_json: Option<PathBuf>,

    /// Report heading
    #[serde(default = "default_title")]
    pub title: String,

    /// Used for the Environment line when the results carry no base URL
    #[serde(default)]
    pub fallback_base_url: Option<String>,
}

fn default_title() -> String {
    "Robot Store Test Report".to_string()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("test-results.json"),
            known_issues: PathBuf::from("known-issues.json"),
            output: PathBuf::from("TEST_REPORT.md"),
            summary_json: None,
            title: default_title(),
            fallback_base_url: None,
        }
    }
}

/// Per-category line of a [`ReportSummary`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub summary: Summary,
}

/// Machine-readable digest of a generated report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub generated_at: String,
    pub run_started: String,
    pub environment: String,
    pub overall: Summary,
    pub categories: Vec<CategorySummary>,
    pub known_failures: usize,
    pub new_bugs: usize,
    pub failures: Vec<FailureNote>,
}

/// Markdown plus its digest, before anything is written
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub markdown: String,
    pub summary: ReportSummary,
    /// Non-fatal problems met while loading inputs
    pub warnings: Vec<String>,
}

/// Result of [`ReportGenerator::run`]
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub output: PathBuf,
    pub summary_json: Option<PathBuf>,
    pub summary: ReportSummary,
    pub warnings: Vec<String>,
}

impl ReportOutcome {
    pub fn has_new_bugs(&self) -> bool {
        self.summary.new_bugs > 0
    }
}

/// Single-pass report compiler
pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Load the ledger; a missing or unreadable ledger degrades to an
    /// empty one and a warning.
    pub fn load_known_issues(&self, warnings: &mut Vec<String>) -> KnownIssues {
        let path = &self.config.known_issues;
        if !path.exists() {
            let message = format!(
                "Known issues file not found at {}; every failure will be reported as a new bug",
                path.display()
            );
            debug!("{}", message);
            warnings.push(message);
            return KnownIssues::new();
        }

        match KnownIssues::from_file(path) {
            Ok(issues) => {
                debug!(entries = issues.len(), path = %path.display(), "loaded known issues");
                issues
            }
            Err(e) => {
                let message = format!(
                    "Could not read known issues from {}: {}; continuing without them",
                    path.display(),
                    e
                );
                debug!("{}", message);
                warnings.push(message);
                KnownIssues::new()
            }
        }
    }

    /// Environment line: results config, first project, configured
    /// fallback, else `N/A`.
    pub fn environment(&self, results: &PlaywrightReport) -> String {
        results
            .base_url()
            .or(self.config.fallback_base_url.as_deref().filter(|u| !u.is_empty()))
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    }

    /// Build the report for already-parsed results
    pub fn render_results(
        &self,
        results: &PlaywrightReport,
        issues: &KnownIssues,
        generated_at: DateTime<Utc>,
    ) -> RenderedReport {
        let records = collect_records(results);
        let index = KnownIssueIndex::build(issues);
        debug!(
            records = records.len(),
            index_keys = index.len(),
            "rendering report"
        );

        let context = ReportContext {
            title: self.config.title.clone(),
            generated_at,
            run_started: results.start_time().map(String::from),
            environment: self.environment(results),
        };
        let markdown = MarkdownReport::new(&context, &records, &index).render();

        let failures = failure_notes(&records, &index);
        let known_failures = failures.iter().filter(|n| n.known).count();
        let summary = ReportSummary {
            generated_at: context.generated_at_display(),
            run_started: context.run_started_display(),
            environment: context.environment.clone(),
            overall: Summary::from_records(&records),
            categories: categories_for_display(&records)
                .iter()
                .map(|g| CategorySummary {
                    name: g.name.clone(),
                    summary: g.summary(),
                })
                .collect(),
            known_failures,
            new_bugs: failures.len() - known_failures,
            failures,
        };

        RenderedReport {
            markdown,
            summary,
            warnings: Vec::new(),
        }
    }

    /// Load both inputs and render, without writing anything
    pub fn render(&self, generated_at: DateTime<Utc>) -> ReportResult<RenderedReport> {
        let results = PlaywrightReport::from_file(&self.config.input)?;
        let mut warnings = Vec::new();
        let issues = self.load_known_issues(&mut warnings);

        let mut rendered = self.render_results(&results, &issues, generated_at);
        rendered.warnings = warnings;
        Ok(rendered)
    }

    /// Generate the report and write the configured artifacts
    pub fn run(&self) -> ReportResult<ReportOutcome> {
        let rendered = self.render(Utc::now())?;
        self.write(rendered)
    }

    /// Write a rendered report to the configured destinations.
    ///
    /// Load warnings travel with `rendered`; callers that report them should
    /// do so before calling this, since a failed write drops them.
    pub fn write(&self, rendered: RenderedReport) -> ReportResult<ReportOutcome> {
        write_artifact(&self.config.output, &rendered.markdown)?;
        debug!("Report written to: {}", self.config.output.display());

        if let Some(path) = &self.config.summary_json {
            let json = serde_json::to_string_pretty(&rendered.summary)?;
            write_artifact(path, &json)?;
            debug!("Summary written to: {}", path.display());
        }

        Ok(ReportOutcome {
            output: self.config.output.clone(),
            summary_json: self.config.summary_json.clone(),
            summary: rendered.summary,
            warnings: rendered.warnings,
        })
    }
}

fn write_artifact(path: &Path, contents: &str) -> ReportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}
