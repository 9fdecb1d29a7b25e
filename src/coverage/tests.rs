//! Tests for coverage report loading.

use super::json_lines::parse_json_lines;
use super::lcov::parse_lcov;
use super::{CoverageSet, LineDetail, ReportFormat, ReportRecord, load_coverage};
use crate::error::PatchCovError;
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;

const LCOV_REPORT: &str = "TN:unit\n\
SF:src/lib.rs\n\
FN:3,add\n\
FNDA:2,add\n\
DA:3,2\n\
DA:4,0\n\
DA:5,7\n\
LF:3\n\
LH:2\n\
BRDA:4,0,0,1\n\
end_of_record\n\
SF:src/main.rs\n\
DA:1,0\n\
end_of_record\n";

const JSON_REPORT: &str = r#"{"file":"src/lib.rs","lines":{"found":3,"hit":2,"details":[{"line":3,"hit":2},{"line":4,"hit":0},{"line":5,"hit":7}]}}
{"file":"src/main.rs","lines":{"found":1,"hit":0,"details":[{"line":1,"hit":0}]}}
"#;

fn covered(set: &CoverageSet, file: &str) -> Vec<usize> {
    set.get(file)
        .map(|record| record.covered_lines.iter().copied().collect())
        .unwrap_or_default()
}

fn write_report(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_parse_lcov_records() {
    let records = parse_lcov(LCOV_REPORT).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].file, "src/lib.rs");
    assert_eq!(records[0].lines.found, 3);
    assert_eq!(records[0].lines.hit, 2);
    assert_eq!(
        records[0].lines.details,
        vec![
            LineDetail { line: 3, hit: 2 },
            LineDetail { line: 4, hit: 0 },
            LineDetail { line: 5, hit: 7 },
        ]
    );
    assert_eq!(records[1].file, "src/main.rs");
}

#[test]
fn test_lcov_and_json_lines_yield_identical_sets() {
    let from_lcov = CoverageSet::from_records(parse_lcov(LCOV_REPORT).unwrap());
    let from_json = CoverageSet::from_records(parse_json_lines(JSON_REPORT).unwrap());

    assert_eq!(from_lcov, from_json);
    assert_eq!(covered(&from_lcov, "src/lib.rs"), vec![3, 5]);
    // Listed in the report but nothing hit.
    assert!(from_lcov.get("src/main.rs").unwrap().covered_lines.is_empty());
}

#[test]
fn test_lcov_da_checksum_is_ignored() {
    let records = parse_lcov("SF:a.c\nDA:7,1,Zm9vYmFy\nend_of_record\n").unwrap();
    assert_eq!(records[0].lines.details, vec![LineDetail { line: 7, hit: 1 }]);
}

#[test]
fn test_lcov_unterminated_record_is_kept() {
    let records = parse_lcov("SF:a.c\nDA:1,1\nSF:b.c\nDA:2,1\n").unwrap();
    let files: Vec<&str> = records.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(files, vec!["a.c", "b.c"]);
}

#[test]
fn test_lcov_unknown_tags_are_skipped() {
    let records = parse_lcov("SF:a.c\nMCDC:1,2,t,0,1,x\nDA:1,1\nend_of_record\n").unwrap();
    assert_eq!(records[0].lines.details.len(), 1);
}

#[test]
fn test_lcov_bad_hit_count_is_parse_error() {
    let err = parse_lcov("SF:a.c\nDA:1,many\nend_of_record\n").unwrap_err();
    assert!(matches!(err, PatchCovError::ReportParseError(_)));
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_lcov_negative_hit_count_is_parse_error() {
    let err = parse_lcov("SF:a.c\nDA:1,-1\n").unwrap_err();
    assert!(matches!(err, PatchCovError::ReportParseError(_)));
}

#[test]
fn test_lcov_da_without_source_file_is_parse_error() {
    let err = parse_lcov("DA:1,1\n").unwrap_err();
    assert!(err.to_string().contains("outside of an SF section"));
}

#[test]
fn test_lcov_truncated_da_is_parse_error() {
    let err = parse_lcov("SF:a.c\nDA:12\n").unwrap_err();
    assert!(err.to_string().contains("expected DA:<line>,<hits>"));
}

#[test]
fn test_lcov_garbage_line_is_parse_error() {
    let err = parse_lcov("this is not lcov\n").unwrap_err();
    assert!(matches!(err, PatchCovError::ReportParseError(_)));
}

#[test]
fn test_lcov_rejects_non_identifier_tags() {
    let err = parse_lcov("[{\"file\":\"a.c\",\"lines\":{\"details\":[]}}]\n").unwrap_err();
    assert!(matches!(err, PatchCovError::ReportParseError(_)));
    assert!(err.to_string().contains("line 1"));

    let err = parse_lcov("SF:a.c\nDA:1,1\n  \"hit\": 3\n").unwrap_err();
    assert!(err.to_string().contains("line 3"));
}

#[test]
fn test_empty_reports_are_empty_sets() {
    assert!(parse_lcov("").unwrap().is_empty());
    assert!(parse_json_lines("\n\n").unwrap().is_empty());
}

#[test]
fn test_json_lines_ignores_unknown_fields() {
    let text = r#"{"title":"t","file":"a.js","lines":{"found":1,"hit":1,"details":[{"line":1,"hit":1}]},"functions":{"found":0,"hit":0,"details":[]}}"#;
    let records = parse_json_lines(text).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file, "a.js");
}

#[test]
fn test_json_lines_malformed_record_is_parse_error() {
    let text = "{\"file\":\"a.js\",\"lines\":{\"details\":[]}}\n{\"file\": 3}\n";
    let err = parse_json_lines(text).unwrap_err();
    assert!(matches!(err, PatchCovError::ReportParseError(_)));
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_json_lines_truncated_record_is_parse_error() {
    let err = parse_json_lines("{\"file\":\"a.js\",\"lines\":").unwrap_err();
    assert!(matches!(err, PatchCovError::ReportParseError(_)));
}

#[test]
fn test_detect_report_format() {
    assert_eq!(ReportFormat::detect(JSON_REPORT), ReportFormat::JsonLines);
    assert_eq!(ReportFormat::detect("\n  {\"file\":\"x\"}"), ReportFormat::JsonLines);
    assert_eq!(ReportFormat::detect(LCOV_REPORT), ReportFormat::Lcov);
    assert_eq!(ReportFormat::detect(""), ReportFormat::Lcov);
}

#[test]
fn test_duplicate_records_are_merged() {
    let text = "SF:a.c\nDA:1,1\nDA:2,0\nend_of_record\nSF:a.c\nDA:2,3\nDA:3,0\nend_of_record\n";
    let set = CoverageSet::from_records(parse_lcov(text).unwrap());

    assert_eq!(set.len(), 1);
    assert_eq!(covered(&set, "a.c"), vec![1, 2]);
}

#[test]
fn test_paths_are_normalized() {
    let set = CoverageSet::from_records(vec![
        ReportRecord {
            file: "./src/a.rs".to_string(),
            ..ReportRecord::default()
        },
        ReportRecord {
            file: "src\\b.rs".to_string(),
            ..ReportRecord::default()
        },
    ]);

    assert!(set.get("src/a.rs").is_some());
    assert!(set.get("src/b.rs").is_some());
}

#[test]
fn test_is_covered() {
    let set = CoverageSet::from_records(parse_lcov(LCOV_REPORT).unwrap());

    assert!(set.is_covered("src/lib.rs", 3));
    assert!(!set.is_covered("src/lib.rs", 4));
    assert!(!set.is_covered("src/lib.rs", 99));
    assert!(!set.is_covered("src/unknown.rs", 3));
}

#[test]
fn test_relative_to_repository_root() {
    let text = "SF:/work/repo/src/lib.rs\nDA:1,1\nend_of_record\n\
SF:/elsewhere/vendor.rs\nDA:1,1\nend_of_record\n\
SF:src/already_relative.rs\nDA:2,1\nend_of_record\n";
    let set = CoverageSet::from_records(parse_lcov(text).unwrap());
    assert!(set.has_absolute_paths());

    let set = set.relative_to(Path::new("/work/repo/"));

    assert_eq!(covered(&set, "src/lib.rs"), vec![1]);
    assert_eq!(covered(&set, "/elsewhere/vendor.rs"), vec![1]);
    assert_eq!(covered(&set, "src/already_relative.rs"), vec![2]);
}

#[test]
fn test_relative_to_merges_with_existing_relative_entry() {
    let text = "SF:/repo/a.rs\nDA:1,1\nend_of_record\nSF:a.rs\nDA:2,1\nend_of_record\n";
    let set = CoverageSet::from_records(parse_lcov(text).unwrap()).relative_to(Path::new("/repo"));

    assert_eq!(set.len(), 1);
    assert_eq!(
        set.get("a.rs").unwrap().covered_lines,
        BTreeSet::from([1, 2])
    );
}

#[test]
fn test_relative_paths_are_not_absolute() {
    let set = CoverageSet::from_records(parse_lcov("SF:src/a.rs\nend_of_record\n").unwrap());
    assert!(!set.has_absolute_paths());

    let windows = CoverageSet::from_records(parse_lcov("SF:C:\\repo\\a.rs\nend_of_record\n").unwrap());
    assert!(windows.has_absolute_paths());
}

#[test]
fn test_load_coverage_lcov_file() {
    let dir = TempDir::new().unwrap();
    let path = write_report(&dir, "lcov.info", LCOV_REPORT);

    let set = load_coverage(&path).unwrap();
    assert_eq!(covered(&set, "src/lib.rs"), vec![3, 5]);
}

#[test]
fn test_load_coverage_json_lines_file() {
    let dir = TempDir::new().unwrap();
    let path = write_report(&dir, "coverage.jsonl", JSON_REPORT);

    let set = load_coverage(&path).unwrap();
    assert_eq!(covered(&set, "src/lib.rs"), vec![3, 5]);
}

#[test]
fn test_load_coverage_skips_byte_order_mark() {
    let dir = TempDir::new().unwrap();
    let json = write_report(&dir, "coverage.jsonl", &format!("\u{feff}{}", JSON_REPORT));
    let lcov = write_report(&dir, "lcov.info", &format!("\u{feff}{}", LCOV_REPORT));

    assert_eq!(covered(&load_coverage(&json).unwrap(), "src/lib.rs"), vec![3, 5]);
    assert_eq!(covered(&load_coverage(&lcov).unwrap(), "src/lib.rs"), vec![3, 5]);
}

#[test]
fn test_load_coverage_json_array_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_report(
        &dir,
        "coverage.json",
        r#"[{"file":"a.txt","lines":{"found":1,"hit":1,"details":[{"line":2,"hit":1}]}}]"#,
    );

    let err = load_coverage(&path).unwrap_err();
    assert!(matches!(err, PatchCovError::ReportParseError(_)));
    assert!(err.to_string().contains("coverage.json"));
}

#[test]
fn test_load_coverage_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.info");

    let err = load_coverage(&path).unwrap_err();
    assert!(matches!(err, PatchCovError::ReportReadError(_)));
    assert!(err.to_string().contains("missing.info"));
}

#[test]
fn test_load_coverage_parse_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = write_report(&dir, "broken.info", "SF:a.c\nDA:x,1\n");

    let err = load_coverage(&path).unwrap_err();
    assert!(matches!(err, PatchCovError::ReportParseError(_)));
    assert!(err.to_string().contains("broken.info"));
    assert!(err.to_string().contains("line 2"));
}
