//! Patchcov: patch coverage gate for CI.
//!
//! This is the main entry point for the `patchcov` CLI. It parses arguments,
//! runs the pipeline, and turns any failure into a message on stderr and a
//! non-zero exit code.

mod cli;
mod commands;
pub mod coverage;
pub mod diff;
pub mod error;
pub mod exit_codes;
pub mod git;
pub mod patch;

#[cfg(test)]
mod test_support;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    init_logging();

    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too and are not failures.
            let code = if err.use_stderr() {
                exit_codes::FAILURE
            } else {
                exit_codes::SUCCESS
            };
            let _ = err.print();
            return ExitCode::from(code as u8);
        }
    };

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error calculating patch coverage: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

/// Diagnostics go to stderr; `RUST_LOG` raises the level (default `warn`).
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
