//! Outcome counting and grouping of test records

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::category::display_order;
use crate::collect::TestRecord;
use crate::status::Outcome;

/// Pass/fail/skip counts for a set of records
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// `passed / (passed + failed) * 100`; skipped tests are excluded and
    /// an empty denominator yields 0.
    pub pass_rate: f64,
}

impl Summary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TestRecord>,
    {
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for record in records {
            match record.outcome() {
                Outcome::Passed => passed += 1,
                Outcome::Failed => failed += 1,
                Outcome::Skipped => skipped += 1,
            }
        }

        let executed = passed + failed;
        let pass_rate = if executed > 0 {
            passed as f64 / executed as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total: passed + failed + skipped,
            passed,
            failed,
            skipped,
            pass_rate,
        }
    }

    pub fn executed(&self) -> usize {
        self.passed + self.failed
    }

    /// Pass rate with two decimals, e.g. `87.50%`
    pub fn pass_rate_display(&self) -> String {
        format!("{:.2}%", self.pass_rate)
    }
}

/// Records of one test file within a category
#[derive(Debug, Clone)]
pub struct FileGroup<'a> {
    pub file: &'a str,
    pub records: Vec<&'a TestRecord>,
}

impl FileGroup<'_> {
    pub fn summary(&self) -> Summary {
        Summary::from_records(self.records.iter().copied())
    }
}

/// Records sharing a category, in collection order
#[derive(Debug, Clone)]
pub struct CategoryGroup<'a> {
    pub name: String,
    pub records: Vec<&'a TestRecord>,
}

impl<'a> CategoryGroup<'a> {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    pub fn summary(&self) -> Summary {
        Summary::from_records(self.records.iter().copied())
    }

    /// Group by file path, keeping first-seen file order
    pub fn files(&self) -> Vec<FileGroup<'a>> {
        let mut groups: Vec<FileGroup<'a>> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();

        for &record in &self.records {
            let file = record.file.as_str();
            match index.get(file) {
                Some(&i) => groups[i].records.push(record),
                None => {
                    index.insert(file, groups.len());
                    groups.push(FileGroup {
                        file,
                        records: vec![record],
                    });
                }
            }
        }

        groups
    }

    pub fn failures(&self) -> impl Iterator<Item = &'a TestRecord> + '_ {
        self.records
            .iter()
            .copied()
            .filter(|r| r.outcome() == Outcome::Failed)
    }
}

/// Group records by category, keeping first-seen category order
pub fn group_by_category(records: &[TestRecord]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match index.get(record.category.as_str()) {
            Some(&i) => groups[i].records.push(record),
            None => {
                index.insert(record.category.as_str(), groups.len());
                groups.push(CategoryGroup {
                    name: record.category.clone(),
                    records: vec![record],
                });
            }
        }
    }

    groups
}

/// Category groups in report order: every primary category (possibly
/// empty) followed by the other observed categories.
pub fn categories_for_display(records: &[TestRecord]) -> Vec<CategoryGroup<'_>> {
    let mut grouped = group_by_category(records);
    let order = display_order(grouped.iter().map(|g| g.name.as_str()));

    order
        .into_iter()
        .map(|name| match grouped.iter().position(|g| g.name == name) {
            Some(i) => grouped.swap_remove(i),
            None => CategoryGroup::empty(name),
        })
        .collect()
}
