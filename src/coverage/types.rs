//! Coverage data model.

use crate::diff::normalize_path;
use log::debug;
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// One per-file record as it appears in a coverage report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportRecord {
    /// Source file path as written by the coverage tool.
    pub file: String,
    /// Line coverage for the file.
    pub lines: LineSummary,
}

/// Line coverage section of a report record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LineSummary {
    /// Instrumented line count reported by the tool.
    #[serde(default)]
    pub found: u64,
    /// Hit line count reported by the tool.
    #[serde(default)]
    pub hit: u64,
    /// Per-line hit counts.
    #[serde(default)]
    pub details: Vec<LineDetail>,
}

/// Hit count for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LineDetail {
    pub line: usize,
    pub hit: u64,
}

/// Lines of one source file executed at least once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageRecord {
    pub file: String,
    pub covered_lines: BTreeSet<usize>,
}

/// Covered lines keyed by normalized file path. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageSet {
    records: HashMap<String, CoverageRecord>,
}

impl CoverageSet {
    /// Build the set from report records.
    ///
    /// Records naming the same file are merged: a line is covered if any
    /// record reports a hit for it.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ReportRecord>,
    {
        let mut set = Self::default();
        for record in records {
            let file = normalize_path(&record.file);
            debug!(
                "{}: {} of {} lines hit",
                file, record.lines.hit, record.lines.found
            );
            let covered_lines = record
                .lines
                .details
                .iter()
                .filter(|detail| detail.hit > 0)
                .map(|detail| detail.line)
                .collect();
            set.insert(CoverageRecord {
                file,
                covered_lines,
            });
        }
        set
    }

    fn insert(&mut self, record: CoverageRecord) {
        match self.records.entry(record.file.clone()) {
            Entry::Occupied(mut existing) => {
                existing.get_mut().covered_lines.extend(record.covered_lines);
            }
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
        }
    }

    /// Coverage for a file, if the report mentions it.
    pub fn get(&self, file: &str) -> Option<&CoverageRecord> {
        self.records.get(file)
    }

    /// Whether `line` of `file` was executed. Files absent from the report are uncovered.
    pub fn is_covered(&self, file: &str, line: usize) -> bool {
        self.get(file)
            .is_some_and(|record| record.covered_lines.contains(&line))
    }

    /// Number of files in the report.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the report listed no files.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any file is keyed by an absolute path.
    pub fn has_absolute_paths(&self) -> bool {
        self.records.keys().any(|file| is_absolute(file))
    }

    /// Rewrite absolute paths under `root` as paths relative to it, so they
    /// line up with the repository-relative paths of a git diff.
    ///
    /// Paths outside `root` and relative paths are kept as they are.
    pub fn relative_to(self, root: &Path) -> Self {
        let root = normalize_path(&root.to_string_lossy());
        let root = root.trim_end_matches('/');

        let mut set = Self::default();
        for mut record in self.records.into_values() {
            if let Some(rest) = record
                .file
                .strip_prefix(root)
                .and_then(|rest| rest.strip_prefix('/'))
                .filter(|rest| !rest.is_empty())
            {
                record.file = rest.to_string();
            }
            set.insert(record);
        }
        set
    }
}

/// Absolute in either Unix (`/x`) or Windows (`C:/x`) form, after normalization.
fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}
