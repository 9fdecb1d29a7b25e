//! LCOV trace file parsing.
//!
//! Only line coverage is kept. Function and branch records are accepted and
//! skipped, as are tags this parser does not know. A line that is not
//! `TAG:value` with an identifier tag is an error.

use crate::error::{PatchCovError, Result};
use log::debug;

use super::types::{LineDetail, ReportRecord};

/// Parse LCOV text into per-file records.
///
/// A record still open at end of input (missing `end_of_record`) is kept.
pub fn parse_lcov(text: &str) -> Result<Vec<ReportRecord>> {
    let mut records = Vec::new();
    let mut current: Option<ReportRecord> = None;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            continue;
        }

        if line == "end_of_record" {
            if let Some(record) = current.take() {
                records.push(record);
            }
            continue;
        }

        let Some((tag, value)) = line
            .split_once(':')
            .filter(|(tag, _)| is_record_tag(tag))
        else {
            return Err(parse_error(line_no, format!("unrecognised line '{}'", line)));
        };

        match tag {
            "SF" => {
                let opened = ReportRecord {
                    file: value.to_string(),
                    ..ReportRecord::default()
                };
                if let Some(unterminated) = current.replace(opened) {
                    records.push(unterminated);
                }
            }
            "DA" => {
                let record = open_record(&mut current, line_no, tag)?;
                let detail = parse_line_data(value, line_no)?;
                record.lines.details.push(detail);
            }
            "LF" => {
                let record = open_record(&mut current, line_no, tag)?;
                record.lines.found = parse_number(value, line_no, "LF")?;
            }
            "LH" => {
                let record = open_record(&mut current, line_no, tag)?;
                record.lines.hit = parse_number(value, line_no, "LH")?;
            }
            "TN" | "VER" | "FN" | "FNDA" | "FNF" | "FNH" | "FNL" | "FNA" | "BRDA" | "BRF"
            | "BRH" => {}
            other => debug!("lcov line {}: ignoring unknown record '{}'", line_no, other),
        }
    }

    if let Some(record) = current {
        records.push(record);
    }

    Ok(records)
}

/// LCOV record tags are plain identifiers (`SF`, `DA`, `BRDA`, ...).
fn is_record_tag(tag: &str) -> bool {
    !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}

fn open_record<'a>(
    current: &'a mut Option<ReportRecord>,
    line_no: usize,
    tag: &str,
) -> Result<&'a mut ReportRecord> {
    current
        .as_mut()
        .ok_or_else(|| parse_error(line_no, format!("{} record outside of an SF section", tag)))
}

/// `DA:<line>,<hits>[,<checksum>]`
fn parse_line_data(value: &str, line_no: usize) -> Result<LineDetail> {
    let mut fields = value.split(',');
    let (Some(line), Some(hit)) = (fields.next(), fields.next()) else {
        return Err(parse_error(
            line_no,
            format!("expected DA:<line>,<hits>, found 'DA:{}'", value),
        ));
    };

    Ok(LineDetail {
        line: parse_number(line, line_no, "DA line number")?,
        hit: parse_number(hit, line_no, "DA hit count")?,
    })
}

fn parse_number<T: std::str::FromStr>(value: &str, line_no: usize, what: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        parse_error(
            line_no,
            format!("{} is not a non-negative integer: '{}'", what, value),
        )
    })
}

fn parse_error(line_no: usize, message: String) -> PatchCovError {
    PatchCovError::ReportParseError(format!("line {}: {}", line_no, message))
}
