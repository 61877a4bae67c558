//! Domain primitive types used across the cloudock workspace.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::error::{CloudockError, Result};

/// Parses a loosely formatted version string into a [`Version`].
///
/// Missing minor/patch components default to zero, a leading `v` is dropped,
/// pre-release and build suffixes are ignored, and components beyond the
/// third are discarded. Returns `None` when the major component is absent or
/// any of the first three components is not a number.
#[must_use]
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    let core = trimmed
        .split(['-', '+'])
        .next()
        .filter(|s| !s.is_empty())?;

    let mut parts = [0_u64; 3];
    for (idx, piece) in core.split('.').take(3).enumerate() {
        parts[idx] = piece.parse().ok()?;
    }
    Some(Version::new(parts[0], parts[1], parts[2]))
}

/// Version of the hosted application whose deployment is being configured.
///
/// Keeps the raw text for diagnostics next to the normalized version used
/// for constraint matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationVersion {
    raw: String,
    version: Version,
}

impl ApplicationVersion {
    /// Parses an application version such as `2.3.4`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a recognizable version.
    pub fn parse(raw: &str) -> Result<Self> {
        let version = parse_version(raw).ok_or_else(|| CloudockError::Config {
            message: format!("invalid application version: \"{raw}\""),
        })?;
        Ok(Self {
            raw: raw.trim().to_string(),
            version,
        })
    }

    /// Returns the normalized semantic version.
    #[must_use]
    pub const fn version(&self) -> &Version {
        &self.version
    }

    /// Returns the version exactly as it was supplied.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for ApplicationVersion {
    type Err = CloudockError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ApplicationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A service whose version can be configured and validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceName {
    /// PHP runtime.
    Php,
    /// MySQL-compatible database.
    Mysql,
    /// Nginx web tier.
    Nginx,
    /// Redis cache.
    Redis,
    /// Elasticsearch search engine.
    Elasticsearch,
    /// RabbitMQ message queue.
    Rabbitmq,
    /// Node.js assets runtime.
    Node,
    /// Varnish caching proxy.
    Varnish,
}

impl ServiceName {
    /// Every known service, in request order.
    pub const ALL: [Self; 8] = [
        Self::Php,
        Self::Mysql,
        Self::Nginx,
        Self::Redis,
        Self::Elasticsearch,
        Self::Rabbitmq,
        Self::Node,
        Self::Varnish,
    ];

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Php => "php",
            Self::Mysql => "mysql",
            Self::Nginx => "nginx",
            Self::Redis => "redis",
            Self::Elasticsearch => "elasticsearch",
            Self::Rabbitmq => "rabbitmq",
            Self::Node => "node",
            Self::Varnish => "varnish",
        }
    }
}

impl FromStr for ServiceName {
    type Err = CloudockError;

    /// Accepts canonical names and the role aliases
    /// (`runtime`, `database`, `db`, `web`, `cache`, `search`, `queue`,
    /// `assets-runtime`).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "php" | "runtime" => Ok(Self::Php),
            "mysql" | "mariadb" | "database" | "db" => Ok(Self::Mysql),
            "nginx" | "web" => Ok(Self::Nginx),
            "redis" | "cache" => Ok(Self::Redis),
            "elasticsearch" | "search" => Ok(Self::Elasticsearch),
            "rabbitmq" | "queue" => Ok(Self::Rabbitmq),
            "node" | "assets-runtime" => Ok(Self::Node),
            "varnish" => Ok(Self::Varnish),
            other => Err(CloudockError::NotFound {
                kind: "service",
                id: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
