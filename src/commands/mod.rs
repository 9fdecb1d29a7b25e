//! The patch coverage pipeline.
//!
//! Loads the coverage report, obtains the diff, and correlates the two.
//! Steps run one after another; nothing is retried.

use crate::cli::Cli;
use crate::coverage::load_coverage;
use crate::error::{PatchCovError, Result};
use crate::git::{DiffSource, GitDiffSource};
use crate::patch::{PatchCoverageResult, calculate_patch_coverage};
use log::{debug, info, warn};

/// Run the CLI: compute patch coverage in the current directory and print it.
pub fn dispatch(cli: Cli) -> Result<()> {
    let source = GitDiffSource::new(".");
    let result = patch_coverage(&cli, &source)?;
    println!("{}", result);
    Ok(())
}

/// Compute patch coverage for `cli.base..cli.head` using `source` for the diff.
pub fn patch_coverage(cli: &Cli, source: &dyn DiffSource) -> Result<PatchCoverageResult> {
    validate_revision(&cli.base)?;
    validate_revision(&cli.head)?;

    let mut coverage = load_coverage(&cli.coverage_file)?;
    if coverage.is_empty() {
        warn!(
            "coverage report {} lists no files",
            cli.coverage_file.display()
        );
    }

    let diff = source.diff(&cli.base, &cli.head)?;

    if coverage.has_absolute_paths() {
        if let Some(root) = source.repo_root() {
            debug!("relativizing coverage paths against {}", root.display());
            coverage = coverage.relative_to(&root);
        }
    }

    let result = calculate_patch_coverage(&diff, &coverage);

    if result.added_lines == 0 {
        warn!("{}..{} adds no lines", cli.base, cli.head);
    }
    for line in &result.uncovered {
        info!(
            "not covered: {}:{}",
            line.file_path.as_deref().unwrap_or("<unknown file>"),
            line.line_number
        );
    }

    Ok(result)
}

/// Revisions end up inside a git argument list; keep them from reading as options.
fn validate_revision(revision: &str) -> Result<()> {
    if revision.is_empty() {
        return Err(PatchCovError::UserError(
            "revision must not be empty".to_string(),
        ));
    }
    if revision.starts_with('-') {
        return Err(PatchCovError::UserError(format!(
            "invalid revision '{}': revisions may not start with '-'",
            revision
        )));
    }
    Ok(())
}
