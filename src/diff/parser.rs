//! Core diff scanning logic.

use log::{debug, warn};

use super::helpers::{parse_diff_git_line, parse_hunk_header, parse_new_file_marker};

/// A single added line from a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedLine<'a> {
    /// Repository-relative file path (forward slashes), if a file header was seen.
    pub file_path: Option<String>,
    /// Line number in the post-change file (1-based).
    pub line_number: usize,
    /// The content of the added line (without leading '+').
    pub content: &'a str,
}

/// Classification of one line of unified diff text, independent of scan state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LineKind<'a> {
    /// `diff --git a/<path> b/<path>`; carries the text after the prefix.
    FileHeader(&'a str),
    /// `@@ ... @@`
    HunkHeader,
    /// `--- a/<path>`
    OldFileMarker,
    /// `+++ b/<path>`; carries the text after the prefix.
    NewFileMarker(&'a str),
    /// `+<content>`
    Added(&'a str),
    /// `-<content>`
    Removed,
    /// `\ No newline at end of file`
    NoNewline,
    /// Anything else, including blank lines.
    Context,
}

pub(super) fn classify(line: &str) -> LineKind<'_> {
    if let Some(rest) = line.strip_prefix("diff --git ") {
        LineKind::FileHeader(rest)
    } else if line.starts_with("@@") {
        LineKind::HunkHeader
    } else if let Some(rest) = line.strip_prefix("+++ ") {
        LineKind::NewFileMarker(rest)
    } else if line.starts_with("--- ") {
        LineKind::OldFileMarker
    } else if let Some(content) = line.strip_prefix('+') {
        LineKind::Added(content)
    } else if line.starts_with('-') {
        LineKind::Removed
    } else if line.starts_with('\\') {
        LineKind::NoNewline
    } else {
        LineKind::Context
    }
}

/// Where the scanner is within the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ScanState {
    /// Before any file header.
    SeekingFile,
    /// Inside a file block, outside any hunk.
    SeekingHunk,
    /// Inside a hunk. `new_line` is the post-change line number of the next
    /// context or added line; the remaining counts come from the hunk header.
    InHunk {
        new_line: usize,
        old_remaining: usize,
        new_remaining: usize,
    },
}

/// Line-at-a-time diff state machine.
#[derive(Debug)]
pub(super) struct DiffScanner {
    state: ScanState,
    current_file: Option<String>,
    /// The previous line was a `--- ` marker outside a hunk.
    after_old_marker: bool,
}

impl DiffScanner {
    pub(super) fn new() -> Self {
        Self {
            state: ScanState::SeekingFile,
            current_file: None,
            after_old_marker: false,
        }
    }

    #[cfg(test)]
    pub(super) fn state(&self) -> ScanState {
        self.state
    }

    #[cfg(test)]
    pub(super) fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    /// Consume one diff line, returning it if it is an added line.
    pub(super) fn feed<'a>(&mut self, line: &'a str) -> Option<AddedLine<'a>> {
        let kind = classify(line);
        let after_old_marker = std::mem::replace(&mut self.after_old_marker, false);

        if let ScanState::InHunk {
            new_line,
            old_remaining,
            new_remaining,
        } = self.state
        {
            // (old lines consumed, new lines consumed, counted as added)
            let step = match kind {
                // Inside a hunk, marker-looking lines are content whose text
                // starts with "++" or "--".
                LineKind::Added(_) | LineKind::NewFileMarker(_) => Some((0, 1, true)),
                LineKind::Removed | LineKind::OldFileMarker => Some((1, 0, false)),
                LineKind::NoNewline => Some((0, 0, false)),
                LineKind::Context => Some((1, 1, false)),
                LineKind::FileHeader(_) | LineKind::HunkHeader => None,
            };

            if let Some((old_used, new_used, added)) = step {
                let old_remaining = old_remaining.saturating_sub(old_used);
                let new_remaining = new_remaining.saturating_sub(new_used);
                self.state = if old_remaining == 0 && new_remaining == 0 {
                    ScanState::SeekingHunk
                } else {
                    ScanState::InHunk {
                        new_line: new_line.saturating_add(new_used),
                        old_remaining,
                        new_remaining,
                    }
                };

                return added.then(|| AddedLine {
                    file_path: self.current_file.clone(),
                    line_number: new_line,
                    content: &line[1..],
                });
            }
        }

        match kind {
            LineKind::FileHeader(rest) => {
                self.current_file = parse_diff_git_line(rest);
                self.state = ScanState::SeekingHunk;
            }
            LineKind::OldFileMarker => self.after_old_marker = true,
            // Only a `---`/`+++` pair names a file; a lone `+++` line between
            // hunks is leftover content of a skipped hunk.
            LineKind::NewFileMarker(rest) if after_old_marker => {
                // Authoritative for plain `diff -u`; `/dev/null` means deleted.
                self.current_file = parse_new_file_marker(rest);
                self.state = ScanState::SeekingHunk;
            }
            LineKind::HunkHeader => self.open_hunk(line),
            // Extended headers (index, mode, rename, Binary files ...) and
            // stray lines between hunks.
            _ => {}
        }
        None
    }

    fn open_hunk(&mut self, line: &str) {
        match parse_hunk_header(line) {
            Some(header) => {
                debug!(
                    "hunk -{},{} +{},{} in {}",
                    header.old_start,
                    header.old_len,
                    header.new_start,
                    header.new_len,
                    self.current_file.as_deref().unwrap_or("<unknown file>")
                );
                self.state = if header.old_len == 0 && header.new_len == 0 {
                    ScanState::SeekingHunk
                } else {
                    ScanState::InHunk {
                        new_line: header.new_start,
                        old_remaining: header.old_len,
                        new_remaining: header.new_len,
                    }
                };
            }
            None => {
                warn!("skipping malformed hunk header: {}", line);
                self.state = ScanState::SeekingHunk;
            }
        }
    }
}

/// Lazy iterator over the added lines of a unified diff.
#[derive(Debug)]
pub struct AddedLines<'a> {
    lines: std::str::Lines<'a>,
    scanner: DiffScanner,
}

impl<'a> Iterator for AddedLines<'a> {
    type Item = AddedLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            if let Some(added) = self.scanner.feed(line) {
                return Some(added);
            }
        }
        None
    }
}

/// Scan a unified diff for added lines in a single forward pass.
pub fn added_lines(diff: &str) -> AddedLines<'_> {
    AddedLines {
        lines: diff.lines(),
        scanner: DiffScanner::new(),
    }
}
