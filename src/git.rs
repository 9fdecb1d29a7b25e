//! Git command runner for patchcov.
//!
//! Provides a wrapper around git commands with captured stdout/stderr and
//! structured error handling, and the [`DiffSource`] seam through which the
//! pipeline obtains the diff between two revisions.

use crate::error::{PatchCovError, Result};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output, untouched (diff text is whitespace sensitive).
    pub stdout: String,
    /// Standard error (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Run a git command with the specified working directory.
///
/// # Arguments
///
/// * `cwd` - The working directory to run the command in
/// * `args` - The git command arguments (without "git" prefix)
///
/// # Returns
///
/// * `Ok(GitOutput)` - On successful execution (exit code 0)
/// * `Err(PatchCovError::DiffAcquisitionError)` - If git cannot be spawned or exits non-zero
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();
    debug!("running git {} in {}", args.join(" "), cwd.display());

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            PatchCovError::DiffAcquisitionError(format!(
                "failed to execute git {}: {} (is git installed?)",
                subcommand(args),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout.trim().to_string()
        } else {
            git_output.stderr
        };

        Err(PatchCovError::DiffAcquisitionError(format!(
            "git {} failed (exit code {}): {}",
            subcommand(args),
            exit_code,
            error_msg
        )))
    }
}

/// The git subcommand in `args`, skipping leading `-c <name>=<value>` pairs.
fn subcommand<'a>(args: &[&'a str]) -> &'a str {
    let mut rest = args;
    while let ["-c", _, tail @ ..] = rest {
        rest = tail;
    }
    rest.first().copied().unwrap_or("")
}

/// Get the repository root directory using `git rev-parse --show-toplevel`.
pub fn get_repo_root<P: AsRef<Path>>(cwd: P) -> Result<PathBuf> {
    let output = run_git(cwd, &["rev-parse", "--show-toplevel"])?;
    Ok(PathBuf::from(output.stdout.trim()))
}

/// Something that can produce the unified diff between two revisions.
pub trait DiffSource {
    /// Unified diff text from `base` to `head`.
    fn diff(&self, base: &str, head: &str) -> Result<String>;

    /// Root directory the diff paths are relative to, when known.
    fn repo_root(&self) -> Option<PathBuf> {
        None
    }
}

/// [`DiffSource`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitDiffSource {
    cwd: PathBuf,
}

impl GitDiffSource {
    /// Diff against the repository containing `cwd`.
    pub fn new<P: Into<PathBuf>>(cwd: P) -> Self {
        Self { cwd: cwd.into() }
    }
}

impl DiffSource for GitDiffSource {
    fn diff(&self, base: &str, head: &str) -> Result<String> {
        let range = format!("{}..{}", base, head);
        // Pin the output shape regardless of user git config. Non-ASCII
        // paths come out verbatim; other special names are still quoted.
        let output = run_git(
            &self.cwd,
            &[
                "-c",
                "core.quotePath=false",
                "diff",
                "--no-color",
                "--no-ext-diff",
                "--src-prefix=a/",
                "--dst-prefix=b/",
                &range,
            ],
        )?;
        Ok(output.stdout)
    }

    fn repo_root(&self) -> Option<PathBuf> {
        match get_repo_root(&self.cwd) {
            Ok(root) => Some(root),
            Err(e) => {
                debug!("cannot resolve repository root: {}", e);
                None
            }
        }
    }
}
