//! Helper functions for diff parsing.

use regex::Regex;
use std::sync::LazyLock;

/// Hunk header: `@@ -<oldStart>[,<oldLen>] +<newStart>[,<newLen>] @@[ context]`.
static HUNK_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("Invalid hunk header regex")
});

/// Line ranges declared by a hunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct HunkHeader {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
}

/// Parse the file path from a "diff --git" line (without the prefix).
///
/// Handles:
/// - "a/path/to/file b/path/to/file" (normal)
/// - "a/path/to/file b/path/to/renamed" (rename)
/// - "a/my file b/my file" (paths with spaces)
/// - "\"a/caf\\303\\251\" \"b/caf\\303\\251\"" (C-quoted by git)
///
/// Returns the new-side path with its `b/` prefix stripped, or None if the
/// line has no recognisable new-side path.
pub(super) fn parse_diff_git_line(rest: &str) -> Option<String> {
    // Inside a quoted path every '"' is escaped, so ` "` starts the new side.
    if rest.ends_with('"') {
        let start = rest.rfind(" \"").map_or(0, |pos| pos + 1);
        if let Some(path) = unquote_c_path(&rest[start..]) {
            return Some(new_side_path(&path));
        }
    }

    // The last " b/" separates the two paths even when they contain spaces.
    if let Some(b_pos) = rest.rfind(" b/") {
        return Some(normalize_path(&rest[b_pos + 3..]));
    }

    // Fallback: second whitespace-separated token.
    let mut parts = rest.split_whitespace();
    let _old = parts.next()?;
    let new = parts.next()?;
    Some(new_side_path(new))
}

/// Parse the path from a "+++ " file marker (without the prefix).
///
/// Returns None for `/dev/null` (deleted file). Plain `diff -u` markers carry a
/// tab-separated timestamp, which is dropped.
pub(super) fn parse_new_file_marker(rest: &str) -> Option<String> {
    let path = rest.split('\t').next().unwrap_or(rest).trim_end();
    if path == "/dev/null" || path.is_empty() {
        return None;
    }
    if path.starts_with('"') {
        if let Some(unquoted) = unquote_c_path(path) {
            return Some(new_side_path(&unquoted));
        }
    }
    Some(new_side_path(path))
}

fn new_side_path(path: &str) -> String {
    normalize_path(path.strip_prefix("b/").unwrap_or(path))
}

/// Decode a path git wrote as a C-style quoted string.
///
/// Git quotes names containing `"`, `\\` or control bytes, and non-ASCII bytes
/// too unless `core.quotePath` is off. Octal escapes are raw bytes, so the
/// decoded bytes are read back as UTF-8. Returns None if `quoted` is not a
/// well-formed quoted string.
pub(super) fn unquote_c_path(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes();

    while let Some(byte) = iter.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        let escaped = iter.next()?;
        let decoded = match escaped {
            b'a' => 0x07,
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'v' => 0x0b,
            b'f' => 0x0c,
            b'r' => b'\r',
            b'"' | b'\\' => escaped,
            b'0'..=b'3' => {
                let mut value = escaped - b'0';
                for _ in 0..2 {
                    let digit = iter.next()?;
                    if !(b'0'..=b'7').contains(&digit) {
                        return None;
                    }
                    value = value * 8 + (digit - b'0');
                }
                value
            }
            _ => return None,
        };
        bytes.push(decoded);
    }

    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse a hunk header line.
///
/// A missing length defaults to 1, as in the unified diff format.
/// Returns None when the line does not have the expected shape.
pub(super) fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let caps = HUNK_HEADER_REGEX.captures(line)?;
    let number = |idx: usize| -> Option<usize> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(1),
        }
    };

    Some(HunkHeader {
        old_start: number(1)?,
        old_len: number(2)?,
        new_start: number(3)?,
        new_len: number(4)?,
    })
}

/// Normalize a file path so diff paths and coverage report paths compare equal.
///
/// Backslashes become forward slashes and a leading `./` is removed.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    match path.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => path,
    }
}
