//! String normalizers shared by the collector, resolver and renderer
//!
//! Every function is total: callers holding an `Option<&str>` pass
//! `unwrap_or_default()` and get an empty string back.

use once_cell::sync::Lazy;
use regex::Regex;

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("ANSI pattern is valid"));

static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+@\S+").expect("tag pattern is valid"));

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static NEWLINE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n]+").expect("newline pattern is valid"));

/// Replace Windows path separators with forward slashes.
pub fn normalize_path(value: &str) -> String {
    value.replace('\\', "/")
}

/// Make a value safe for a single Markdown table cell.
///
/// Backslashes are escaped before pipes so an existing `\|` keeps its pipe
/// inside the cell.
pub fn escape_md(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('|', "\\|");
    NEWLINE_RUN.replace_all(&escaped, " ").trim().to_string()
}

/// Remove annotation tags such as ` @smoke` from a test title.
pub fn strip_tags(title: &str) -> String {
    TITLE_TAG.replace_all(title, "").into_owned()
}

/// Collapse whitespace runs to a single space and trim.
pub fn normalize_title(title: &str) -> String {
    WHITESPACE_RUN.replace_all(title, " ").trim().to_string()
}

/// Remove SGR color sequences emitted by terminal reporters.
pub fn strip_ansi(value: &str) -> String {
    ANSI_ESCAPE.replace_all(value, "").into_owned()
}

/// ANSI-stripped, single-line form of an error message.
pub fn single_line(value: &str) -> String {
    normalize_title(&strip_ansi(value))
}
