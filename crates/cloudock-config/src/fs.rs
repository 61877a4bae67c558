//! File access shared by the readers: I/O errors carry the path, YAML
//! errors carry the document they came from.

use std::path::Path;

use cloudock_common::error::{CloudockError, Result};
use serde::de::DeserializeOwned;

pub(crate) fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CloudockError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads `path`, or returns `None` when it does not exist.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "optional file absent");
        return Ok(None);
    }
    read(path).map(Some)
}

pub(crate) fn parse_yaml<T: DeserializeOwned>(content: &str, path: &Path) -> Result<T> {
    serde_yaml::from_str(content).map_err(|e| CloudockError::Yaml {
        path: path.to_path_buf(),
        source: e,
    })
}
