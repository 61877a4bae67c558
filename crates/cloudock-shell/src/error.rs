//! Errors raised while running external commands.
//!
//! Every command line carried by an error is already sanitized.

use std::time::Duration;

use thiserror::Error;

/// Failure of an external command.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The process could not be started.
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        /// Sanitized command line.
        command: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The process exited unsuccessfully.
    #[error("command `{command}` failed with exit code {code}: {stderr}")]
    Failed {
        /// Sanitized command line.
        command: String,
        /// Exit code, or `-1` when the process was terminated by a signal.
        code: i32,
        /// Captured standard error, sanitized.
        stderr: String,
    },

    /// The process outlived its timeout and was killed.
    #[error("command `{command}` timed out after {}s", timeout.as_secs_f64())]
    Timeout {
        /// Sanitized command line.
        command: String,
        /// Timeout that expired.
        timeout: Duration,
    },

    /// A required program is not on the search path.
    #[error("program `{program}` not found: {source}")]
    NotFound {
        /// Program name.
        program: String,
        /// Lookup failure.
        source: which::Error,
    },
}

/// Convenience alias for shell operations.
pub type Result<T> = std::result::Result<T, ShellError>;
