//! Test category detection and display ordering

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::normalize_path;

/// Fixed category vocabulary, in display priority order.
pub const KNOWN_CATEGORIES: [&str; 7] = [
    "a11y",
    "api",
    "e2e",
    "integration",
    "security",
    "performance",
    "other",
];

/// Categories always shown in the report, even with no records.
pub const PRIMARY_CATEGORIES: [&str; 5] = ["a11y", "api", "e2e", "integration", "security"];

/// Bucket for files that match neither detection rule.
pub const FALLBACK_CATEGORY: &str = "other";

static TESTS_SUBDIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:^|/)tests/([^/]+)/").expect("tests pattern is valid"));

/// Derive a category from a test file path.
///
/// `.../tests/<dir>/...` yields `<dir>` lower-cased. Otherwise a first path
/// segment naming a known category is used, and anything else is `other`.
pub fn detect_category(file_path: &str) -> String {
    let path = normalize_path(file_path);

    if let Some(caps) = TESTS_SUBDIR.captures(&path) {
        return caps[1].to_lowercase();
    }

    let first = path
        .split('/')
        .find(|segment| !segment.is_empty())
        .map(str::to_lowercase);

    match first {
        Some(segment) if KNOWN_CATEGORIES.contains(&segment.as_str()) => segment,
        _ => FALLBACK_CATEGORY.to_string(),
    }
}

/// Position of a category in the display priority list.
///
/// Unlisted categories share the rank after the last listed one.
pub fn category_rank(category: &str) -> usize {
    KNOWN_CATEGORIES
        .iter()
        .position(|known| *known == category)
        .unwrap_or(KNOWN_CATEGORIES.len())
}

pub fn compare_categories(a: &str, b: &str) -> Ordering {
    category_rank(a)
        .cmp(&category_rank(b))
        .then_with(|| a.cmp(b))
}

/// Categories to render: the primary five, then every other observed
/// category sorted by rank and name.
pub fn display_order<'a, I>(observed: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut extra: Vec<&str> = observed
        .into_iter()
        .filter(|c| !PRIMARY_CATEGORIES.contains(c))
        .collect();
    extra.sort_by(|a, b| compare_categories(a, b));
    extra.dedup();

    PRIMARY_CATEGORIES
        .iter()
        .copied()
        .chain(extra)
        .map(String::from)
        .collect()
}
