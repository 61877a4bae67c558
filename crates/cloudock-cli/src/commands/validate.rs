//! `cloudock validate`: Check service versions against the application version.

use std::path::Path;

use anyhow::bail;
use clap::Args;
use cloudock_compose::compiler::Compiler;

use crate::commands::{ServiceArgs, load_request};
use crate::output;

/// Arguments for the `validate` command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Service version overrides.
    #[command(flatten)]
    pub services: ServiceArgs,
}

/// Executes the `validate` command.
///
/// Every incompatibility is reported, one per line.
///
/// # Errors
///
/// Returns an error listing the incompatibilities if any exist, or if the
/// project cannot be loaded.
pub fn execute(args: &ValidateArgs, project_dir: &Path) -> anyhow::Result<()> {
    let request = load_request(project_dir, &args.services)?;
    if let Err(e) = Compiler::builtin()?.compile(&request) {
        bail!(output::format_failure(&e));
    }
    output::print(&format!(
        "Service versions are compatible with application {}.",
        request.application
    ))
}
