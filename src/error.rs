//! Error types for the patchcov CLI.
//!
//! Uses thiserror for derive macros. Every error is reported once at the top
//! level and terminates the process with a non-zero exit code.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for patchcov operations.
#[derive(Error, Debug)]
pub enum PatchCovError {
    /// The invocation itself was invalid.
    #[error("{0}")]
    UserError(String),

    /// The coverage report is missing or unreadable.
    #[error("cannot read coverage report: {0}")]
    ReportReadError(String),

    /// A coverage record is malformed.
    #[error("invalid coverage report: {0}")]
    ReportParseError(String),

    /// Git could not produce the diff between the two revisions.
    #[error("cannot obtain diff: {0}")]
    DiffAcquisitionError(String),
}

impl PatchCovError {
    /// Returns the exit code for this error.
    ///
    /// All failures share one code; the message on stderr tells them apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            PatchCovError::UserError(_)
            | PatchCovError::ReportReadError(_)
            | PatchCovError::ReportParseError(_)
            | PatchCovError::DiffAcquisitionError(_) => exit_codes::FAILURE,
        }
    }
}

/// Result type alias for patchcov operations.
pub type Result<T> = std::result::Result<T, PatchCovError>;
