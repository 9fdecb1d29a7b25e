//! Line-delimited JSON coverage records.
//!
//! Each record has the shape
//! `{"file": "...", "lines": {"found": N, "hit": N, "details": [{"line": N, "hit": N}]}}`.
//! Unknown fields are ignored.

use crate::error::{PatchCovError, Result};
use serde_json::Deserializer;

use super::types::ReportRecord;

/// Decode every record in the text. Any malformed record fails the whole report.
pub fn parse_json_lines(text: &str) -> Result<Vec<ReportRecord>> {
    Deserializer::from_str(text)
        .into_iter::<ReportRecord>()
        .map(|record| record.map_err(|e| PatchCovError::ReportParseError(e.to_string())))
        .collect()
}
