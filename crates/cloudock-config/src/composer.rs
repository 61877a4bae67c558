//! Application version lookup in `composer.lock`.

use std::path::Path;

use cloudock_common::constants::APPLICATION_PACKAGES;
use cloudock_common::error::{CloudockError, Result};
use cloudock_common::types::ApplicationVersion;
use serde::Deserialize;

use crate::fs;

#[derive(Debug, Deserialize)]
struct LockFile {
    #[serde(default)]
    packages: Vec<LockedPackage>,
}

#[derive(Debug, Deserialize)]
struct LockedPackage {
    name: String,
    version: String,
}

/// Reads the application version from the lock file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or locks none of
/// the application packages.
pub fn load(path: &Path) -> Result<ApplicationVersion> {
    let content = fs::read(path)?;
    let version = parse(&content)?;
    tracing::debug!(path = %path.display(), version = %version, "application version locked");
    Ok(version)
}

/// Extracts the application version from lock file JSON.
///
/// Packages are tried in [`APPLICATION_PACKAGES`] order.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, no application package is
/// locked, or its version is not recognizable.
pub fn parse(content: &str) -> Result<ApplicationVersion> {
    let lock: LockFile = serde_json::from_str(content)?;
    let package = APPLICATION_PACKAGES
        .iter()
        .find_map(|name| lock.packages.iter().find(|p| p.name == *name))
        .ok_or_else(|| CloudockError::NotFound {
            kind: "package",
            id: APPLICATION_PACKAGES[0].to_string(),
        })?;
    ApplicationVersion::parse(&package.version)
}
