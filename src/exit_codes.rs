//! Exit code constants for the patchcov CLI.
//!
//! - 0: Success (a coverage line was printed)
//! - 1: Failure of any kind (bad arguments, unreadable report, git failure)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Any failure. A CI gate only needs to distinguish pass from fail.
pub const FAILURE: i32 = 1;
