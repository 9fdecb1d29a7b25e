//! Coverage report loading for patchcov.
//!
//! Two report shapes are accepted and yield the same [`CoverageSet`]:
//! - LCOV trace files (`SF:` / `DA:` / `end_of_record`)
//! - Line-delimited JSON, one per-file record per line
//!
//! The shape is detected from the report content, after any UTF-8 byte
//! order mark.

mod json_lines;
mod lcov;
mod types;

#[cfg(test)]
mod tests;

use crate::error::{PatchCovError, Result};
use log::debug;
use std::fmt;
use std::path::Path;

pub use types::{CoverageRecord, CoverageSet, LineDetail, LineSummary, ReportRecord};

/// On-disk coverage report shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// LCOV trace file.
    Lcov,
    /// One JSON record per line.
    JsonLines,
}

impl ReportFormat {
    /// Detect the report shape: JSON records start with `{`, anything else is LCOV.
    pub fn detect(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            Self::JsonLines
        } else {
            Self::Lcov
        }
    }

    /// Parse report text into per-file records.
    pub fn parse(self, text: &str) -> Result<Vec<ReportRecord>> {
        match self {
            Self::Lcov => lcov::parse_lcov(text),
            Self::JsonLines => json_lines::parse_json_lines(text),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lcov => write!(f, "lcov"),
            Self::JsonLines => write!(f, "json-lines"),
        }
    }
}

/// Load a coverage report from disk.
///
/// # Returns
///
/// * `Ok(CoverageSet)` - Covered lines per file
/// * `Err(PatchCovError::ReportReadError)` - The file is missing or unreadable
/// * `Err(PatchCovError::ReportParseError)` - A record is malformed
pub fn load_coverage<P: AsRef<Path>>(path: P) -> Result<CoverageSet> {
    let path = path.as_ref();

    let text = std::fs::read_to_string(path).map_err(|e| {
        PatchCovError::ReportReadError(format!("{}: {}", path.display(), e))
    })?;

    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let format = ReportFormat::detect(text);
    debug!("reading {} as {} coverage report", path.display(), format);

    let records = format.parse(text).map_err(|e| match e {
        PatchCovError::ReportParseError(msg) => {
            PatchCovError::ReportParseError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })?;

    let coverage = CoverageSet::from_records(records);
    debug!("coverage report lists {} file(s)", coverage.len());
    Ok(coverage)
}
