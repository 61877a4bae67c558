//! `cloudock build`: Compile the topology and write the compose file.

use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::Args;
use cloudock_common::config::ProjectPaths;
use cloudock_compose::compiler::Compiler;
use cloudock_shell::{Shell, resolve_program};

use crate::commands::{ServiceArgs, load_request};
use crate::output;

/// Orchestrator used to check the written document.
const COMPOSE_PROGRAM: &str = "docker-compose";

/// Arguments for the `build` command.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Service version overrides.
    #[command(flatten)]
    pub services: ServiceArgs,

    /// Output path, relative to the project directory.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Have the orchestrator parse the written document.
    #[arg(long)]
    pub verify: bool,
}

/// Executes the `build` command.
///
/// # Errors
///
/// Returns an error if the project cannot be loaded, compilation fails, the
/// file cannot be written, or verification rejects it.
pub fn execute(args: &BuildArgs, project_dir: &Path) -> anyhow::Result<()> {
    let request = load_request(project_dir, &args.services)?;
    let topology = match Compiler::builtin()?.compile(&request) {
        Ok(topology) => topology,
        Err(e) => bail!(output::format_failure(&e)),
    };

    let mut paths = ProjectPaths::new(project_dir);
    if let Some(path) = &args.output {
        paths = paths.with_compose_file(path);
    }
    output::write_compose(&paths.compose_file, &topology)?;

    if args.verify {
        verify(project_dir, &paths.compose_file)?;
    }

    output::print(&format!(
        "Configuration was built: {}",
        paths.compose_file.display()
    ))
}

fn verify(project_dir: &Path, compose_file: &Path) -> anyhow::Result<()> {
    let program = resolve_program(COMPOSE_PROGRAM)?;
    let relative = compose_file.strip_prefix(project_dir).unwrap_or(compose_file);
    let file = relative.to_string_lossy();
    let _ = Shell::new(project_dir).execute(
        &program.to_string_lossy(),
        &["-f", file.as_ref(), "config", "-q"],
    )?;
    tracing::info!(file = %file, "compose file verified");
    Ok(())
}
