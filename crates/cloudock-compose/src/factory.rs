//! Construction of single service definitions.
//!
//! [`create`] is pure: the same kind, version, and options always produce
//! the same [`ServiceDefinition`]. Versions are threaded into the image
//! reference as given; checking them is the validator's job.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

/// Kinds of services the factory knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// PHP command-line image for helper containers.
    PhpCli,
    /// PHP-FPM image serving requests.
    PhpFpm,
    /// MariaDB database.
    Db,
    /// Nginx web tier.
    Nginx,
    /// Varnish caching proxy.
    Varnish,
    /// TLS terminator.
    Tls,
    /// Redis cache.
    Redis,
    /// Elasticsearch search engine.
    Elasticsearch,
    /// RabbitMQ message queue.
    RabbitMq,
    /// Node.js assets runtime.
    Node,
    /// Minimal base image carrying the shared environment.
    Base,
}

impl ServiceKind {
    /// Returns the image reference for `version`.
    #[must_use]
    pub fn image(self, version: &str) -> String {
        match self {
            Self::PhpCli => format!("magento/magento-cloud-docker-php:{version}-cli"),
            Self::PhpFpm => format!("magento/magento-cloud-docker-php:{version}-fpm"),
            Self::Db => format!("mariadb:{version}"),
            Self::Nginx => format!("magento/magento-cloud-docker-nginx:{version}"),
            Self::Varnish => format!("magento/magento-cloud-docker-varnish:{version}"),
            Self::Tls => format!("magento/magento-cloud-docker-tls:{version}"),
            Self::Redis => format!("redis:{version}"),
            Self::Elasticsearch => format!("magento/magento-cloud-docker-elasticsearch:{version}"),
            Self::RabbitMq => format!("rabbitmq:{version}"),
            Self::Node => format!("node:{version}"),
            // The base only carries shared settings; its floating tag stays implicit.
            Self::Base if version.is_empty() || version == "latest" => "alpine".to_string(),
            Self::Base => format!("alpine:{version}"),
        }
    }

    /// Per-kind defaults that caller options are layered onto.
    fn defaults(self) -> ServiceOptions {
        match self {
            Self::Db => ServiceOptions::new().ports([3306]),
            Self::Varnish => ServiceOptions::new()
                .ports([80])
                .env("VIRTUAL_HOST", "magento2.docker")
                .env("VIRTUAL_PORT", "80")
                .env("HTTPS_METHOD", "noredirect"),
            Self::Tls => ServiceOptions::new().ports([443]),
            Self::Redis => ServiceOptions::new().ports([6379]).volumes(["/data"]),
            Self::Elasticsearch => ServiceOptions::new().ports([9200]),
            Self::RabbitMq => ServiceOptions::new().ports([5672]),
            Self::PhpCli | Self::PhpFpm | Self::Nginx | Self::Node | Self::Base => {
                ServiceOptions::new()
            }
        }
    }
}

/// Caller-supplied overrides for one service.
///
/// Deserializing rejects unrecognized keys, which is how malformed option
/// bags from configuration files are caught.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceOptions {
    /// Exposed container ports.
    pub ports: BTreeSet<u16>,
    /// Mount specifications, in order.
    pub volumes: Vec<String>,
    /// Environment variables.
    pub environment: BTreeMap<String, String>,
    /// Services that must start first, in order.
    pub depends_on: Vec<String>,
    /// Container hostname.
    pub hostname: Option<String>,
    /// Name of the shared base definition this service is composed with.
    pub extends: Option<String>,
    /// Entrypoint command override.
    pub command: Option<String>,
}

impl ServiceOptions {
    /// Creates an empty option bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from an untyped YAML value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidOptions`] for unknown keys or
    /// wrongly typed values.
    pub fn from_yaml(value: serde_yaml::Value) -> Result<Self> {
        serde_yaml::from_value(value).map_err(|e| ConfigurationError::InvalidOptions {
            message: e.to_string(),
        })
    }

    /// Sets the exposed ports.
    #[must_use]
    pub fn ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.ports = ports.into_iter().collect();
        self
    }

    /// Sets the mount specifications.
    #[must_use]
    pub fn volumes<S: Into<String>>(mut self, volumes: impl IntoIterator<Item = S>) -> Self {
        self.volumes = volumes.into_iter().map(Into::into).collect();
        self
    }

    /// Adds an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.environment.insert(key.into(), value.into());
        self
    }

    /// Sets the startup dependencies.
    #[must_use]
    pub fn depends_on<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.depends_on = names.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the hostname.
    #[must_use]
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Marks the service as composed with a shared base definition.
    #[must_use]
    pub fn extends(mut self, base: impl Into<String>) -> Self {
        self.extends = Some(base.into());
        self
    }

    /// Overrides the entrypoint command.
    #[must_use]
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Layers `self` onto `base`: non-empty collections and set scalars of
    /// `self` replace those of `base`; environment maps are merged with
    /// `self` winning per key.
    fn layered_on(self, mut base: Self) -> Self {
        if !self.ports.is_empty() {
            base.ports = self.ports;
        }
        if !self.volumes.is_empty() {
            base.volumes = self.volumes;
        }
        base.environment.extend(self.environment);
        if !self.depends_on.is_empty() {
            base.depends_on = self.depends_on;
        }
        base.hostname = self.hostname.or(base.hostname);
        base.extends = self.extends.or(base.extends);
        base.command = self.command.or(base.command);
        base
    }
}

/// A fully specified container definition.
///
/// Serializes as one entry of a compose document's `services` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDefinition {
    /// Name in the topology.
    #[serde(skip)]
    pub name: String,
    /// Kind the definition was built from.
    #[serde(skip)]
    pub kind: ServiceKind,
    /// Service version threaded into the image.
    #[serde(skip)]
    pub version: String,
    /// Image reference.
    pub image: String,
    /// Container hostname.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Shared base definition this service is composed with.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_extends"
    )]
    pub extends: Option<String>,
    /// Exposed container ports.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub ports: BTreeSet<u16>,
    /// Startup dependencies, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Mount specifications, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// Environment variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    /// Environment files loaded by the orchestrator.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env_file: Vec<String>,
    /// Entrypoint command override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl ServiceDefinition {
    /// Returns a copy whose environment and env files start from `base`'s,
    /// with this definition's own variables winning per key.
    #[must_use]
    pub fn composed_with(&self, base: &Self) -> Self {
        let mut composed = self.clone();
        let mut environment = base.environment.clone();
        environment.extend(self.environment.clone());
        composed.environment = environment;
        let mut env_file = base.env_file.clone();
        env_file.extend(
            self.env_file
                .iter()
                .filter(|f| !base.env_file.contains(f))
                .cloned(),
        );
        composed.env_file = env_file;
        composed
    }
}

/// Renders `extends` in its long form, `{ service: <name> }`.
#[allow(clippy::ref_option)]
fn serialize_extends<S>(
    extends: &Option<String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(1))?;
    if let Some(service) = extends {
        map.serialize_entry("service", service)?;
    }
    map.end()
}

/// Builds one service definition.
#[must_use]
pub fn create(kind: ServiceKind, version: &str, options: ServiceOptions) -> ServiceDefinition {
    let options = options.layered_on(kind.defaults());
    ServiceDefinition {
        name: String::new(),
        kind,
        version: version.to_string(),
        image: kind.image(version),
        hostname: options.hostname,
        extends: options.extends,
        ports: options.ports,
        depends_on: options.depends_on,
        volumes: options.volumes,
        environment: options.environment,
        env_file: Vec::new(),
        command: options.command,
    }
}
