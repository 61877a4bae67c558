//! # cloudock-shell
//!
//! Runs external commands on behalf of the CLI.
//!
//! Handles:
//! - **Shell**: Argument quoting, working directory, optional timeout, and output capture.
//! - **Sanitize**: Masking of secrets before a command line is logged or reported.

pub mod error;
pub mod sanitize;
pub mod shell;

pub use error::{Result, ShellError};
pub use shell::{Shell, resolve_program};
