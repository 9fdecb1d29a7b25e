//! Patch coverage calculation.
//!
//! Correlates the added lines of a diff with a coverage report and reports
//! the share of added lines that no test executed.


use crate::coverage::CoverageSet;
use crate::diff::added_lines;
use log::debug;
use std::fmt;

/// An added line that the coverage report does not mark as executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncoveredLine {
    /// File the line was added to, if the diff named one.
    pub file_path: Option<String>,
    /// Line number in the post-change file.
    pub line_number: usize,
}

/// Outcome of correlating a diff with a coverage report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchCoverageResult {
    /// Number of lines the diff adds.
    pub added_lines: usize,
    /// Number of added lines with no recorded hit.
    pub uncovered_added_lines: usize,
    /// The uncovered lines, in diff order.
    pub uncovered: Vec<UncoveredLine>,
}

impl PatchCoverageResult {
    /// Uncovered share of the added lines, or None for a patch that adds nothing.
    pub fn ratio(&self) -> Option<f64> {
        if self.added_lines == 0 {
            None
        } else {
            Some(self.uncovered_added_lines as f64 / self.added_lines as f64)
        }
    }

    /// Uncovered share as a percentage.
    ///
    /// A patch that adds no lines leaves nothing untested and reports 0%.
    pub fn uncovered_percentage(&self) -> f64 {
        self.ratio().map_or(0.0, |ratio| ratio * 100.0)
    }
}

impl fmt::Display for PatchCoverageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Patch coverage: {:.2}%", self.uncovered_percentage())
    }
}

/// Compute patch coverage for a unified diff.
///
/// Each added line is checked against the covered lines of the file it was
/// added to; lines in files missing from the report count as uncovered.
pub fn calculate_patch_coverage(diff: &str, coverage: &CoverageSet) -> PatchCoverageResult {
    let mut result = PatchCoverageResult::default();

    for line in added_lines(diff) {
        result.added_lines += 1;

        let covered = line
            .file_path
            .as_deref()
            .is_some_and(|file| coverage.is_covered(file, line.line_number));

        if !covered {
            result.uncovered_added_lines += 1;
            result.uncovered.push(UncoveredLine {
                file_path: line.file_path,
                line_number: line.line_number,
            });
        }
    }

    debug!(
        "{} of {} added line(s) uncovered",
        result.uncovered_added_lines, result.added_lines
    );
    result
}
