//! The services config: `<name>: { type: <kind>:<version> }` entries.
//!
//! Entries are matched on their type, not their key, so `database: {type:
//! mysql:10.2}` configures the database. Types with no configurable
//! counterpart are skipped.

use std::path::Path;

use cloudock_common::error::Result;
use cloudock_common::types::ServiceName;
use cloudock_compose::request::ServiceRequest;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::fs;

#[derive(Debug, Deserialize)]
struct RawService {
    #[serde(rename = "type")]
    kind: String,
}

/// Reads the services config at `path`. A missing file yields an empty request.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load(path: &Path) -> Result<ServiceRequest> {
    match fs::read_optional(path)? {
        Some(content) => parse(&content, path),
        None => Ok(ServiceRequest::new()),
    }
}

/// Parses services config text; `origin` is used in error messages.
///
/// # Errors
///
/// Returns an error if the YAML is malformed.
pub fn parse(content: &str, origin: &Path) -> Result<ServiceRequest> {
    let mut request = ServiceRequest::new();
    if content.trim().is_empty() {
        return Ok(request);
    }

    let raw: IndexMap<String, RawService> = fs::parse_yaml(content, origin)?;
    for (key, service) in raw {
        let (kind, version) = service
            .kind
            .split_once(':')
            .unwrap_or((service.kind.as_str(), ""));
        match kind.parse::<ServiceName>() {
            Ok(name) if name != ServiceName::Php => request.set(name, version),
            _ => tracing::debug!(key = %key, kind, "service type is not configurable; skipped"),
        }
    }
    Ok(request)
}
