//! Known-issues ledger and failed-test reconciliation

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{ReportError, ReportResult};
use crate::text::{normalize_title, strip_tags};

/// Status shown for a matched issue whose ledger entry has no status
pub const DEFAULT_KNOWN_STATUS: &str = "Known Issue";

/// Ledger entry for a test that is expected to fail
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KnownIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl KnownIssue {
    /// Read an entry leniently: non-objects become an empty entry and
    /// scalar fields of any type are stringified.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| match value.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        };
        Self {
            root_cause: field("root_cause"),
            ticket: field("ticket"),
            status: field("status"),
        }
    }

    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_KNOWN_STATUS)
    }
}

/// Known-issues table in file order, keyed by (possibly tagged) test title
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnownIssues {
    entries: Vec<(String, KnownIssue)>,
}

impl KnownIssues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: impl Into<String>, issue: KnownIssue) {
        self.entries.push((title.into(), issue));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KnownIssue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn from_json(json: &str) -> ReportResult<Self> {
        serde_json::from_str(json).map_err(ReportError::from)
    }

    pub fn from_yaml(yaml: &str) -> ReportResult<Self> {
        serde_yaml::from_str(yaml).map_err(ReportError::from)
    }

    /// Load a ledger, using YAML for `.yaml`/`.yml` files and JSON otherwise
    pub fn from_file(path: &Path) -> ReportResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);
        if is_yaml {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }
}

impl<'de> Deserialize<'de> for KnownIssues {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LedgerVisitor;

        impl<'de> Visitor<'de> for LedgerVisitor {
            type Value = KnownIssues;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of test titles to known-issue entries")
            }

            fn visit_unit<E>(self) -> Result<KnownIssues, E> {
                Ok(KnownIssues::new())
            }

            fn visit_map<A>(self, mut map: A) -> Result<KnownIssues, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut issues = KnownIssues::new();
                while let Some((title, value)) = map.next_entry::<String, Value>()? {
                    issues.insert(title, KnownIssue::from_value(&value));
                }
                Ok(issues)
            }
        }

        deserializer.deserialize_any(LedgerVisitor)
    }
}

type Candidate = fn(&str, &str) -> String;

fn raw_test_name(test_name: &str, _full_title: &str) -> String {
    test_name.to_string()
}

fn untagged_test_name(test_name: &str, _full_title: &str) -> String {
    strip_tags(test_name)
}

fn raw_full_title(_test_name: &str, full_title: &str) -> String {
    full_title.to_string()
}

fn untagged_full_title(_test_name: &str, full_title: &str) -> String {
    strip_tags(full_title)
}

/// Title variants tried against the index, highest priority first
pub const LOOKUP_CANDIDATES: [(&str, Candidate); 4] = [
    ("test name", raw_test_name),
    ("untagged test name", untagged_test_name),
    ("full title", raw_full_title),
    ("untagged full title", untagged_full_title),
];

/// Normalized-title lookup over a [`KnownIssues`] table
#[derive(Debug, Clone, Default)]
pub struct KnownIssueIndex {
    by_title: HashMap<String, KnownIssue>,
}

impl KnownIssueIndex {
    /// Index each key both as written and with tags stripped. Colliding
    /// keys keep the entry that appears last in the ledger.
    pub fn build(issues: &KnownIssues) -> Self {
        let mut by_title = HashMap::new();
        for (title, issue) in issues.iter() {
            by_title.insert(normalize_title(title), issue.clone());
            by_title.insert(normalize_title(&strip_tags(title)), issue.clone());
        }
        Self { by_title }
    }

    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }

    /// First ledger entry matching any of [`LOOKUP_CANDIDATES`], in order
    pub fn resolve(&self, test_name: &str, full_title: &str) -> Option<&KnownIssue> {
        LOOKUP_CANDIDATES.iter().find_map(|(label, candidate)| {
            let key = normalize_title(&candidate(test_name, full_title));
            let hit = self.by_title.get(&key);
            if hit.is_some() {
                debug!(candidate = *label, title = %key, "matched known issue");
            }
            hit
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(root_cause: &str, ticket: &str) -> KnownIssue {
        KnownIssue {
            root_cause: Some(root_cause.to_string()),
            ticket: Some(ticket.to_string()),
            status: None,
        }
    }

    #[test]
    fn test_parse_json_ledger_preserves_order() {
        let issues = KnownIssues::from_json(
            r#"{
                "zeta test": {"root_cause": "a", "ticket": 42},
                "alpha test @flaky": {"status": "Won't Fix"},
                "bare string": "not an object"
            }"#,
        )
        .unwrap();
        let titles: Vec<&str> = issues.iter().map(|(t, _)| t).collect();
        assert_eq!(titles, vec!["zeta test", "alpha test @flaky", "bare string"]);

        let (_, first) = issues.iter().next().unwrap();
        assert_eq!(first.ticket.as_deref(), Some("42"));
        let (_, third) = issues.iter().nth(2).unwrap();
        assert_eq!(third, &KnownIssue::default());
    }

    #[test]
    fn test_parse_yaml_ledger() {
        let issues = KnownIssues::from_yaml(
            r#"
"checkout fails on retry @flaky":
  root_cause: race condition
  ticket: JIRA-123
"search returns stale results":
  status: Monitoring
"#,
        )
        .unwrap();
        assert_eq!(issues.len(), 2);
        let (_, second) = issues.iter().nth(1).unwrap();
        assert_eq!(second.status_label(), "Monitoring");
    }

    #[test]
    fn test_empty_ledger_documents() {
        assert!(KnownIssues::from_json("{}").unwrap().is_empty());
        assert!(KnownIssues::from_json("null").unwrap().is_empty());
    }

    #[test]
    fn test_resolve_via_untagged_key() {
        let mut issues = KnownIssues::new();
        issues.insert("checkout fails on retry @flaky", issue("race condition", "JIRA-123"));
        let index = KnownIssueIndex::build(&issues);

        let hit = index
            .resolve("checkout fails on retry", "Checkout > checkout fails on retry")
            .unwrap();
        assert_eq!(hit.root_cause.as_deref(), Some("race condition"));
        assert_eq!(hit.ticket.as_deref(), Some("JIRA-123"));
        assert_eq!(hit.status_label(), DEFAULT_KNOWN_STATUS);
    }

    #[test]
    fn test_resolve_via_full_title() {
        let mut issues = KnownIssues::new();
        issues.insert("Cart  >  removes item", issue("stale cache", "QA-7"));
        let index = KnownIssueIndex::build(&issues);

        let hit = index.resolve("removes item @regression", "Cart > removes item @regression");
        assert_eq!(hit.and_then(|i| i.ticket.as_deref()), Some("QA-7"));
    }

    #[test]
    fn test_test_name_takes_precedence_over_full_title() {
        let mut issues = KnownIssues::new();
        issues.insert("Checkout > pays with card", issue("gateway sandbox down", "OPS-1"));
        issues.insert("pays with card", issue("currency rounding", "QA-2"));
        let index = KnownIssueIndex::build(&issues);

        let hit = index.resolve("pays with card", "Checkout > pays with card").unwrap();
        assert_eq!(hit.ticket.as_deref(), Some("QA-2"));
    }

    #[test]
    fn test_last_colliding_key_wins() {
        let mut issues = KnownIssues::new();
        issues.insert("login works @smoke", issue("first", "A-1"));
        issues.insert("login works", issue("second", "A-2"));
        let index = KnownIssueIndex::build(&issues);

        let hit = index.resolve("login works", "Auth > login works").unwrap();
        assert_eq!(hit.ticket.as_deref(), Some("A-2"));
    }

    #[test]
    fn test_unmatched_returns_none() {
        let index = KnownIssueIndex::build(&KnownIssues::new());
        assert!(index.is_empty());
        assert!(index.resolve("anything", "Suite > anything").is_none());
    }
}
