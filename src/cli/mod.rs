//! CLI argument parsing for patchcov.
//!
//! Uses clap derive macros. The tool takes exactly three positional
//! arguments and no options.

use clap::Parser;
use std::path::PathBuf;

/// Patchcov: share of newly added lines that no test executes.
///
/// Diffs BASE..HEAD in the current repository, looks every added line up in
/// the coverage report, and prints the uncovered percentage. The report may be
/// an LCOV trace file or line-delimited JSON records.
#[derive(Parser, Debug)]
#[command(name = "patchcov")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base revision (older side of the diff).
    pub base: String,

    /// Head revision (newer side of the diff).
    pub head: String,

    /// Coverage report file (LCOV or line-delimited JSON).
    pub coverage_file: PathBuf,
}

impl Cli {
    /// Parse command line arguments, leaving error reporting to the caller.
    pub fn parse_args() -> Result<Self, clap::Error> {
        Cli::try_parse()
    }
}
