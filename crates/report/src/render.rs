//! Markdown rendering of the aggregated report

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{categories_for_display, CategoryGroup, Summary};
use crate::collect::TestRecord;
use crate::known_issues::KnownIssueIndex;
use crate::status::Outcome;
use crate::text::escape_md;

pub const NOT_AVAILABLE: &str = "N/A";
pub const NEW_BUG_STATUS: &str = "🔴 New Bug / Investigate";
pub const NO_ERROR_CAPTURED: &str = "No error message captured";
pub const NO_TICKET: &str = "-";

const SUMMARY_HEADER: [&str; 6] = ["Category", "Total", "Passed", "Failed", "Skipped", "Pass Rate"];
const FILE_HEADER: [&str; 6] = ["File", "Total", "Passed", "Failed", "Skipped", "Pass Rate"];
const FAILURE_HEADER: [&str; 5] = ["File", "Test", "Root Cause / Error", "Action / Ticket", "Status"];

/// Header values of the report
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    /// Raw run start time from the results document
    pub run_started: Option<String>,
    pub environment: String,
}

impl ReportContext {
    pub fn generated_at_display(&self) -> String {
        iso_timestamp(&self.generated_at)
    }

    /// Run start in the same ISO-8601 form as the generation time, the raw
    /// value if it does not parse, or `N/A`.
    pub fn run_started_display(&self) -> String {
        match self.run_started.as_deref() {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|t| iso_timestamp(&t.with_timezone(&Utc)))
                .unwrap_or_else(|_| raw.to_string()),
            None => NOT_AVAILABLE.to_string(),
        }
    }
}

fn iso_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One row of a category's Failure Notes table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureNote {
    pub category: String,
    pub file: String,
    pub test: String,
    pub cause: String,
    pub ticket: String,
    pub status: String,
    pub known: bool,
}

impl FailureNote {
    pub fn new(record: &TestRecord, issues: &KnownIssueIndex) -> Self {
        let known = issues.resolve(&record.test_name, &record.full_title);

        let cause = known
            .and_then(|k| k.root_cause.as_deref())
            .filter(|c| !c.is_empty())
            .or(Some(record.error_message.as_str()).filter(|e| !e.is_empty()))
            .unwrap_or(NO_ERROR_CAPTURED)
            .to_string();

        Self {
            category: record.category.clone(),
            file: file_name(&record.file).to_string(),
            test: format!("[{}] {}", record.project_name, record.test_name),
            cause,
            ticket: known
                .and_then(|k| k.ticket.clone())
                .unwrap_or_else(|| NO_TICKET.to_string()),
            status: known
                .map(|k| k.status_label().to_string())
                .unwrap_or_else(|| NEW_BUG_STATUS.to_string()),
            known: known.is_some(),
        }
    }

    fn cells(&self) -> [&str; 5] {
        [
            self.file.as_str(),
            self.test.as_str(),
            self.cause.as_str(),
            self.ticket.as_str(),
            self.status.as_str(),
        ]
    }
}

/// Failure notes for every failed record, in record order
pub fn failure_notes(records: &[TestRecord], issues: &KnownIssueIndex) -> Vec<FailureNote> {
    records
        .iter()
        .filter(|r| r.outcome() == Outcome::Failed)
        .map(|r| FailureNote::new(r, issues))
        .collect()
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Heading text for a category section
pub fn category_heading(category: &str) -> String {
    let label = match category {
        "a11y" => "Accessibility (a11y)".to_string(),
        "api" => "API".to_string(),
        "e2e" => "E2E".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    };
    format!("{label} Tests")
}

/// GitHub-style anchor for a heading
pub fn anchor(heading: &str) -> String {
    heading
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}

fn table_row<S: AsRef<str>>(cells: &[S]) -> String {
    let escaped: Vec<String> = cells.iter().map(|c| escape_md(c.as_ref())).collect();
    format!("| {} |", escaped.join(" | "))
}

fn table_header(header: &[&str], numeric_from: usize) -> [String; 2] {
    let align: Vec<&str> = (0..header.len())
        .map(|i| if i >= numeric_from { "---:" } else { "---" })
        .collect();
    [table_row(header), table_row(&align)]
}

fn summary_row(label: &str, summary: &Summary) -> String {
    table_row(&[
        label.to_string(),
        summary.total.to_string(),
        summary.passed.to_string(),
        summary.failed.to_string(),
        summary.skipped.to_string(),
        summary.pass_rate_display(),
    ])
}

/// Markdown report builder
pub struct MarkdownReport<'a> {
    context: &'a ReportContext,
    records: &'a [TestRecord],
    issues: &'a KnownIssueIndex,
}

impl<'a> MarkdownReport<'a> {
    pub fn new(
        context: &'a ReportContext,
        records: &'a [TestRecord],
        issues: &'a KnownIssueIndex,
    ) -> Self {
        Self {
            context,
            records,
            issues,
        }
    }

    /// Render the full document; always ends with a newline.
    pub fn render(&self) -> String {
        let categories = categories_for_display(self.records);
        let overall = Summary::from_records(self.records);
        let notes = failure_notes(self.records, self.issues);

        let mut lines: Vec<String> = Vec::new();
        self.push_header(&mut lines);
        push_toc(&mut lines, &categories);
        push_executive_summary(&mut lines, &categories, &overall, &notes);
        for group in &categories {
            push_category_section(&mut lines, group, &notes);
        }
        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        let mut document = lines.join("\n");
        document.push('\n');
        document
    }

    fn push_header(&self, lines: &mut Vec<String>) {
        lines.push(format!("# {}", self.context.title));
        lines.push(String::new());
        lines.push(format!(
            "- **Generated At:** {}",
            self.context.generated_at_display()
        ));
        lines.push(format!(
            "- **Run Started:** {}",
            self.context.run_started_display()
        ));
        lines.push(format!("- **Environment:** {}", self.context.environment));
        lines.push(String::new());
    }
}

fn push_toc(lines: &mut Vec<String>, categories: &[CategoryGroup<'_>]) {
    lines.push("## Table of Contents".to_string());
    lines.push(String::new());
    lines.push("- [Executive Summary](#executive-summary)".to_string());
    for group in categories {
        let heading = category_heading(&group.name);
        lines.push(format!("- [{}](#{})", heading, anchor(&heading)));
    }
    lines.push(String::new());
}

fn push_executive_summary(
    lines: &mut Vec<String>,
    categories: &[CategoryGroup<'_>],
    overall: &Summary,
    notes: &[FailureNote],
) {
    lines.push("## Executive Summary".to_string());
    lines.push(String::new());
    lines.extend(table_header(&SUMMARY_HEADER, 1));
    for group in categories {
        lines.push(summary_row(&group.name, &group.summary()));
    }
    lines.push(summary_row("**Overall**", overall));
    lines.push(String::new());

    let known = notes.iter().filter(|n| n.known).count();
    lines.push(format!(
        "- **Executed:** {} of {} tests ({} skipped)",
        overall.executed(),
        overall.total,
        overall.skipped
    ));
    lines.push(format!("- **Overall Pass Rate:** {}", overall.pass_rate_display()));
    lines.push(format!("- **Known Issues:** {}", known));
    lines.push(format!("- **New Bugs:** {}", notes.len() - known));
    lines.push(String::new());
}

fn push_category_section(lines: &mut Vec<String>, group: &CategoryGroup<'_>, notes: &[FailureNote]) {
    lines.push(format!("## {}", category_heading(&group.name)));
    lines.push(String::new());
    lines.extend(table_header(&FILE_HEADER, 1));

    let files = group.files();
    if files.is_empty() {
        lines.push(summary_row("-", &Summary::default()));
    }
    for file in &files {
        lines.push(summary_row(file.file, &file.summary()));
    }
    lines.push(String::new());

    let category_notes: Vec<&FailureNote> = notes
        .iter()
        .filter(|n| n.category == group.name)
        .collect();
    if category_notes.is_empty() {
        return;
    }

    lines.push("### Failure Notes".to_string());
    lines.push(String::new());
    lines.extend(table_header(&FAILURE_HEADER, FAILURE_HEADER.len()));
    for note in category_notes {
        lines.push(table_row(&note.cells()));
    }
    lines.push(String::new());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::known_issues::{KnownIssue, KnownIssues};
    use chrono::TimeZone;

    fn context() -> ReportContext {
        ReportContext {
            title: "Robot Store Test Report".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            run_started: Some("2026-10-18T08:00:00.000Z".to_string()),
            environment: "https://store.example.test".to_string(),
        }
    }

    fn record(category: &str, file: &str, name: &str, status: &str, error: &str) -> TestRecord {
        TestRecord {
            category: category.to_string(),
            file: file.to_string(),
            test_name: name.to_string(),
            full_title: format!("{file} > {name}"),
            project_name: "chromium".to_string(),
            status: status.to_string(),
            error_message: error.to_string(),
        }
    }

    /// Column delimiters as a Markdown renderer sees them: a backslash
    /// escapes whatever character follows it.
    fn unescaped_pipes(line: &str) -> usize {
        let mut count = 0;
        let mut chars = line.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '|' => count += 1,
                _ => {}
            }
        }
        count
    }

    #[test]
    fn test_header_lines() {
        let doc = MarkdownReport::new(&context(), &[], &KnownIssueIndex::default()).render();
        assert!(doc.starts_with("# Robot Store Test Report\n"));
        assert!(doc.contains("- **Generated At:** 2026-10-18T09:30:00.000Z"));
        assert!(doc.contains("- **Run Started:** 2026-10-18T08:00:00.000Z"));
        assert!(doc.contains("- **Environment:** https://store.example.test"));
        assert!(doc.ends_with('\n'));
        assert!(!doc.ends_with("\n\n"));
    }

    #[test]
    fn test_run_started_display() {
        let mut ctx = context();
        ctx.run_started = Some("2026-10-18T10:00:00+02:00".to_string());
        assert_eq!(ctx.run_started_display(), "2026-10-18T08:00:00.000Z");
        ctx.run_started = Some("yesterday".to_string());
        assert_eq!(ctx.run_started_display(), "yesterday");
        ctx.run_started = None;
        assert_eq!(ctx.run_started_display(), NOT_AVAILABLE);
    }

    #[test]
    fn test_empty_report_shows_primary_categories() {
        let doc = MarkdownReport::new(&context(), &[], &KnownIssueIndex::default()).render();
        for category in ["a11y", "api", "e2e", "integration", "security"] {
            assert!(doc.contains(&format!("| {category} | 0 | 0 | 0 | 0 | 0.00% |")));
        }
        assert!(doc.contains("| **Overall** | 0 | 0 | 0 | 0 | 0.00% |"));
        assert_eq!(doc.matches("| - | 0 | 0 | 0 | 0 | 0.00% |").count(), 5);
        assert!(!doc.contains("Failure Notes"));
        assert!(!doc.contains("Performance Tests"));
    }

    #[test]
    fn test_table_of_contents_anchors() {
        let doc = MarkdownReport::new(&context(), &[], &KnownIssueIndex::default()).render();
        assert!(doc.contains("- [Executive Summary](#executive-summary)"));
        assert!(doc.contains("- [Accessibility (a11y) Tests](#accessibility-a11y-tests)"));
        assert!(doc.contains("- [API Tests](#api-tests)"));
        assert!(doc.contains("## Integration Tests"));
    }

    #[test]
    fn test_failure_notes_for_new_bug() {
        let records = vec![
            record("api", "tests/api/login.spec.ts", "logs in", "passed", ""),
            record("e2e", "tests/e2e/checkout.spec.ts", "checks out", "timedOut", "Test timeout of 30000ms exceeded."),
        ];
        let doc = MarkdownReport::new(&context(), &records, &KnownIssueIndex::default()).render();

        assert!(doc.contains("| api | 1 | 1 | 0 | 0 | 100.00% |"));
        assert!(doc.contains("| e2e | 1 | 0 | 1 | 0 | 0.00% |"));
        assert!(doc.contains("| tests/e2e/checkout.spec.ts | 1 | 0 | 1 | 0 | 0.00% |"));
        assert_eq!(doc.matches("### Failure Notes").count(), 1);
        assert!(doc.contains(
            "| checkout.spec.ts | [chromium] checks out | Test timeout of 30000ms exceeded. | - | 🔴 New Bug / Investigate |"
        ));
        assert!(doc.contains("- **New Bugs:** 1"));
    }

    #[test]
    fn test_failure_notes_for_known_issue() {
        let mut issues = KnownIssues::new();
        issues.insert(
            "checkout fails on retry @flaky",
            KnownIssue {
                root_cause: Some("race condition".to_string()),
                ticket: Some("JIRA-123".to_string()),
                status: None,
            },
        );
        let index = KnownIssueIndex::build(&issues);
        let mut failed = record("e2e", "tests/e2e/checkout.spec.ts", "checkout fails on retry", "failed", "boom");
        failed.full_title = "Checkout > checkout fails on retry".to_string();

        let notes = failure_notes(&[failed], &index);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].cause, "race condition");
        assert_eq!(notes[0].ticket, "JIRA-123");
        assert_eq!(notes[0].status, "Known Issue");
        assert!(notes[0].known);
    }

    #[test]
    fn test_cause_fallback_chain() {
        let mut issues = KnownIssues::new();
        issues.insert("no cause recorded", KnownIssue::default());
        let index = KnownIssueIndex::build(&issues);

        let matched = record("api", "tests/api/a.spec.ts", "no cause recorded", "failed", "500 from /cart");
        assert_eq!(FailureNote::new(&matched, &index).cause, "500 from /cart");

        let silent = record("api", "tests/api/a.spec.ts", "silent failure", "failed", "");
        let note = FailureNote::new(&silent, &index);
        assert_eq!(note.cause, NO_ERROR_CAPTURED);
        assert_eq!(note.status, NEW_BUG_STATUS);
    }

    #[test]
    fn test_cells_are_markdown_safe() {
        let records = vec![record(
            "security",
            "tests/security/xss.spec.ts",
            "escapes <a|b> in search",
            "failed",
            "expected 'a | b'\nreceived 'a\r\nb'",
        )];
        let doc = MarkdownReport::new(&context(), &records, &KnownIssueIndex::default()).render();
        let row = doc
            .lines()
            .find(|l| l.starts_with("| xss.spec.ts"))
            .expect("failure row rendered");
        assert_eq!(unescaped_pipes(row), 6);
        assert!(row.contains(r"escapes <a\|b> in search"));
        assert!(row.contains(r"expected 'a \| b' received 'a b'"));
    }

    #[test]
    fn test_escaped_pipe_in_message_stays_in_cell() {
        let records = vec![record(
            "e2e",
            "tests/e2e/search.spec.ts",
            "filters results",
            "failed",
            r"expect(locator).toHaveText(/a\|b/) failed",
        )];
        let doc = MarkdownReport::new(&context(), &records, &KnownIssueIndex::default()).render();
        let row = doc
            .lines()
            .find(|l| l.starts_with("| search.spec.ts"))
            .expect("failure row rendered");
        assert_eq!(unescaped_pipes(row), 6);
        assert!(row.contains(r"toHaveText(/a\\\|b/) failed"));
    }

    #[test]
    fn test_extra_categories_follow_primary() {
        let records = vec![
            record("visual", "tests/visual/home.spec.ts", "home", "passed", ""),
            record("performance", "performance/k6/smoke.js", "smoke", "passed", ""),
        ];
        let doc = MarkdownReport::new(&context(), &records, &KnownIssueIndex::default()).render();
        let security = doc.find("## Security Tests").unwrap();
        let performance = doc.find("## Performance Tests").unwrap();
        let visual = doc.find("## Visual Tests").unwrap();
        assert!(security < performance && performance < visual);
    }

    #[test]
    fn test_anchor() {
        assert_eq!(anchor("Executive Summary"), "executive-summary");
        assert_eq!(anchor("E2E Tests"), "e2e-tests");
        assert_eq!(anchor("Smoke_checks Tests"), "smoke_checks-tests");
    }
}
