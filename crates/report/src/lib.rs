//! Robot Store test report generator
//!
//! This crate compiles a Playwright JSON reporter document into a Markdown
//! test report:
//! - Flattens the nested suite/spec/test tree into one record per test
//! - Classifies each record by category (from its file path) and outcome
//! - Reconciles failed tests against a curated known-issues ledger
//! - Renders executive summary, per-category detail and failure-note tables
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ReportGenerator (single pass)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  test-results.json ──► playwright::PlaywrightReport         │
//! │                           │                                 │
//! │                           ▼                                 │
//! │                     collect::collect_records                │
//! │                           │  (category + outcome per record)│
//! │                           ▼                                 │
//! │  known-issues.json ─► KnownIssueIndex    aggregate::Summary │
//! │                           │                   │             │
//! │                           └──────► render ◄───┘             │
//! │                                      │                      │
//! │                                      ▼                      │
//! │                               TEST_REPORT.md                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod aggregate;
pub mod category;
pub mod collect;
pub mod error;
pub mod generator;
pub mod known_issues;
pub mod playwright;
pub mod render;
pub mod status;
pub mod text;

pub use aggregate::{CategoryGroup, FileGroup, Summary};
pub use collect::{collect_records, TestRecord};
pub use error::{ReportError, ReportResult};
pub use generator::{RenderedReport, ReportConfig, ReportGenerator, ReportOutcome};
pub use known_issues::{KnownIssue, KnownIssueIndex, KnownIssues};
pub use playwright::PlaywrightReport;
pub use status::{classify_status, Outcome};
