//! `cloudock plan`: Show the startup order and images without writing anything.

use std::path::Path;

use anyhow::bail;
use clap::Args;
use cloudock_compose::compiler::Compiler;

use crate::commands::{ServiceArgs, load_request};
use crate::output;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Service version overrides.
    #[command(flatten)]
    pub services: ServiceArgs,
}

/// Executes the `plan` command.
///
/// # Errors
///
/// Returns an error if the project cannot be loaded or compilation fails.
pub fn execute(args: &PlanArgs, project_dir: &Path) -> anyhow::Result<()> {
    let request = load_request(project_dir, &args.services)?;
    let topology = match Compiler::builtin()?.compile(&request) {
        Ok(topology) => topology,
        Err(e) => bail!(output::format_failure(&e)),
    };
    output::print(&format!(
        "Plan for application {}:\n\n{}",
        request.application,
        output::format_plan(&topology)?
    ))
}
