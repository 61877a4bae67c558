//! Rendering of compiled topologies for the terminal and the compose file.

use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use cloudock_compose::error::ConfigurationError;
use cloudock_compose::topology::Topology;

/// Renders `topology` as a compose YAML document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_yaml(topology: &Topology) -> anyhow::Result<String> {
    serde_yaml::to_string(topology).context("failed to render compose document")
}

/// Writes the compose document for `topology` to `path`.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn write_compose(path: &Path, topology: &Topology) -> anyhow::Result<()> {
    let yaml = render_yaml(topology)?;
    std::fs::write(path, yaml)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "compose file written");
    Ok(())
}

/// Formats the startup order with each service's image.
///
/// # Errors
///
/// Returns an error if the dependency graph cannot be ordered.
pub fn format_plan(topology: &Topology) -> anyhow::Result<String> {
    let order = topology.startup_order()?;
    let mut out = String::new();
    let _ = writeln!(out, "Startup order:");
    for name in &order {
        if let Some(service) = topology.service(name) {
            let _ = writeln!(out, "  + {name:<14} {}", service.image);
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  {} service(s), {} volume(s).",
        order.len(),
        topology.volumes().len()
    );
    Ok(out)
}

/// Formats a compilation failure: one line per validation message, or the
/// error itself.
#[must_use]
pub fn format_failure(error: &ConfigurationError) -> String {
    let errors = error.validation_errors();
    if errors.is_empty() {
        error.to_string()
    } else {
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Writes `text` to standard output.
///
/// # Errors
///
/// Returns an error if standard output is closed.
pub fn print(text: &str) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}
