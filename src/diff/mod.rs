//! Unified diff scanning for patchcov.
//!
//! Turns `git diff` output into the stream of added lines, each tagged with
//! the file it belongs to and its line number in the post-change file.
//!
//! The scan is a single forward pass driven by a small state machine
//! (`SeekingFile -> SeekingHunk -> InHunk`) and supports:
//! - `diff --git` headers, including renames and paths with spaces
//! - Plain `diff -u`/`diff -ruN` output (file taken from the `---`/`+++` pair)
//! - Paths C-quoted by git (`"b/caf\303\251.txt"`)
//! - New and deleted files (`/dev/null` markers)
//! - Hunk headers with or without lengths and trailing context; a hunk ends
//!   once its declared old and new line counts are used up
//! - `\ No newline at end of file` markers

mod helpers;
mod parser;


pub use helpers::normalize_path;
pub use parser::added_lines;
