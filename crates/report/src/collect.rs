//! Flattening of the Playwright suite tree into per-test records

use tracing::debug;

use crate::category::detect_category;
use crate::playwright::{PlaywrightReport, ProjectTest, Spec, Suite};
use crate::status::{classify_status, Outcome};
use crate::text::normalize_path;

pub const UNTITLED_TEST: &str = "(untitled test)";
pub const UNKNOWN: &str = "unknown";
pub const TITLE_SEPARATOR: &str = " > ";

/// One executed test case under one project
#[derive(Debug, Clone, PartialEq)]
pub struct TestRecord {
    pub category: String,
    pub file: String,
    pub test_name: String,
    pub full_title: String,
    pub project_name: String,
    /// Raw status of the final attempt
    pub status: String,
    pub error_message: String,
}

impl TestRecord {
    pub fn outcome(&self) -> Outcome {
        classify_status(&self.status)
    }
}

/// Flatten every suite of the report, in document order.
pub fn collect_records(report: &PlaywrightReport) -> Vec<TestRecord> {
    let mut records = Vec::new();
    let mut parent_titles = Vec::new();
    for suite in &report.suites {
        collect_suite(suite, &mut parent_titles, None, &mut records);
    }
    debug!(count = records.len(), "collected test records");
    records
}

fn collect_suite<'a>(
    suite: &'a Suite,
    parent_titles: &mut Vec<&'a str>,
    inherited_file: Option<&'a str>,
    records: &mut Vec<TestRecord>,
) {
    let file = suite
        .file
        .as_deref()
        .filter(|f| !f.is_empty())
        .or(inherited_file);

    parent_titles.push(suite.title.as_deref().unwrap_or_default());

    for child in &suite.suites {
        collect_suite(child, parent_titles, file, records);
    }
    for spec in &suite.specs {
        collect_spec(spec, parent_titles, file, records);
    }

    parent_titles.pop();
}

fn collect_spec(
    spec: &Spec,
    parent_titles: &[&str],
    suite_file: Option<&str>,
    records: &mut Vec<TestRecord>,
) {
    let raw_file = spec
        .file
        .as_deref()
        .filter(|f| !f.is_empty())
        .or(suite_file)
        .unwrap_or(UNKNOWN);
    let file = normalize_path(raw_file);
    let category = detect_category(&file);

    let spec_title = spec.title.as_deref().unwrap_or_default();
    let test_name = if spec_title.trim().is_empty() {
        UNTITLED_TEST.to_string()
    } else {
        spec_title.to_string()
    };

    let full_title = parent_titles
        .iter()
        .copied()
        .chain(std::iter::once(spec_title))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(TITLE_SEPARATOR);

    for test in &spec.tests {
        let (status, error_message) = final_attempt(test);
        records.push(TestRecord {
            category: category.clone(),
            file: file.clone(),
            test_name: test_name.clone(),
            full_title: full_title.clone(),
            project_name: test
                .project_name
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            status,
            error_message,
        });
    }
}

/// Status and error of the last attempt; earlier retries are ignored.
fn final_attempt(test: &ProjectTest) -> (String, String) {
    let last = test.results.last();
    let status = last
        .and_then(|r| r.status.as_deref())
        .filter(|s| !s.is_empty())
        .or_else(|| test.status.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or(UNKNOWN)
        .to_string();
    let error_message = last.map(|r| r.error_message()).unwrap_or_default();
    (status, error_message)
}
