//! Compiler inputs: requested service versions and platform defaults.

use cloudock_common::constants;
use cloudock_common::types::{ApplicationVersion, ServiceName};

use crate::cron::CronJob;
use crate::extension::ExtensionConfig;

/// Requested versions for the configurable services.
///
/// Each service is either present with a non-empty version or absent.
/// Empty strings are normalized to absent when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRequest {
    php: Option<String>,
    mysql: Option<String>,
    nginx: Option<String>,
    redis: Option<String>,
    elasticsearch: Option<String>,
    rabbitmq: Option<String>,
    node: Option<String>,
}

impl ServiceRequest {
    /// Services that can be requested, in iteration order.
    pub const KEYS: [ServiceName; 7] = [
        ServiceName::Php,
        ServiceName::Mysql,
        ServiceName::Nginx,
        ServiceName::Redis,
        ServiceName::Elasticsearch,
        ServiceName::Rabbitmq,
        ServiceName::Node,
    ];

    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or clears, for an empty version) the version of `service`.
    ///
    /// Services outside [`Self::KEYS`] are ignored.
    pub fn set(&mut self, service: ServiceName, version: impl Into<String>) {
        let version = version.into();
        let version = Some(version.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(slot) = self.slot_mut(service) {
            *slot = version;
        } else {
            tracing::debug!(%service, "service version is not configurable; ignored");
        }
    }

    /// Builder-style variant of [`Self::set`].
    #[must_use]
    pub fn with(mut self, service: ServiceName, version: impl Into<String>) -> Self {
        self.set(service, version);
        self
    }

    /// Returns the requested version of `service`, if any.
    #[must_use]
    pub fn get(&self, service: ServiceName) -> Option<&str> {
        let slot = match service {
            ServiceName::Php => &self.php,
            ServiceName::Mysql => &self.mysql,
            ServiceName::Nginx => &self.nginx,
            ServiceName::Redis => &self.redis,
            ServiceName::Elasticsearch => &self.elasticsearch,
            ServiceName::Rabbitmq => &self.rabbitmq,
            ServiceName::Node => &self.node,
            ServiceName::Varnish => return None,
        };
        slot.as_deref()
    }

    /// Returns the present `(service, version)` pairs in [`Self::KEYS`] order.
    #[must_use]
    pub fn entries(&self) -> Vec<(ServiceName, &str)> {
        Self::KEYS
            .iter()
            .filter_map(|&name| self.get(name).map(|v| (name, v)))
            .collect()
    }

    /// Overlays every present entry of `other` onto `self`.
    #[must_use]
    pub fn merged_with(mut self, other: &Self) -> Self {
        for (name, version) in other.entries() {
            self.set(name, version);
        }
        self
    }

    fn slot_mut(&mut self, service: ServiceName) -> Option<&mut Option<String>> {
        match service {
            ServiceName::Php => Some(&mut self.php),
            ServiceName::Mysql => Some(&mut self.mysql),
            ServiceName::Nginx => Some(&mut self.nginx),
            ServiceName::Redis => Some(&mut self.redis),
            ServiceName::Elasticsearch => Some(&mut self.elasticsearch),
            ServiceName::Rabbitmq => Some(&mut self.rabbitmq),
            ServiceName::Node => Some(&mut self.node),
            ServiceName::Varnish => None,
        }
    }
}

/// Versions used when the request leaves the runtime or database unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDefaults {
    /// Runtime version declared by the application config.
    pub php: String,
    /// Platform default database version.
    pub mysql: String,
}

impl Default for PlatformDefaults {
    fn default() -> Self {
        Self {
            php: constants::DEFAULT_PHP_VERSION.to_string(),
            mysql: constants::DEFAULT_DB_VERSION.to_string(),
        }
    }
}

/// Everything the compiler needs for one topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    /// Application version the services must be compatible with.
    pub application: ApplicationVersion,
    /// Explicitly requested service versions.
    pub services: ServiceRequest,
    /// Extension enable/disable lists.
    pub extensions: ExtensionConfig,
    /// Cron jobs, in declaration order.
    pub crons: Vec<CronJob>,
    /// Fallback versions.
    pub defaults: PlatformDefaults,
    /// Host directory mounted as the composer cache in CLI helpers.
    pub composer_cache: String,
}

impl CompileRequest {
    /// Creates a request with no services, extensions, or crons.
    #[must_use]
    pub fn new(application: ApplicationVersion) -> Self {
        Self {
            application,
            services: ServiceRequest::default(),
            extensions: ExtensionConfig::default(),
            crons: Vec::new(),
            defaults: PlatformDefaults::default(),
            composer_cache: constants::LEGACY_COMPOSER_CACHE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_version_means_absent() {
        let request = ServiceRequest::new()
            .with(ServiceName::Redis, "")
            .with(ServiceName::Elasticsearch, "   ");
        assert!(request.entries().is_empty());
        assert_eq!(request.get(ServiceName::Redis), None);
    }

    #[test]
    fn entries_follow_key_order() {
        let request = ServiceRequest::new()
            .with(ServiceName::Node, "10")
            .with(ServiceName::Php, "7.2")
            .with(ServiceName::Redis, "5.0");
        let names: Vec<ServiceName> = request.entries().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![ServiceName::Php, ServiceName::Redis, ServiceName::Node]
        );
    }

    #[test]
    fn varnish_is_not_requestable() {
        let request = ServiceRequest::new().with(ServiceName::Varnish, "5.0");
        assert_eq!(request.get(ServiceName::Varnish), None);
        assert!(request.entries().is_empty());
    }

    #[test]
    fn merge_overrides_only_present_entries() {
        let base = ServiceRequest::new()
            .with(ServiceName::Mysql, "10.0")
            .with(ServiceName::Redis, "3.2");
        let overrides = ServiceRequest::new().with(ServiceName::Redis, "5.0");
        let merged = base.merged_with(&overrides);
        assert_eq!(merged.get(ServiceName::Mysql), Some("10.0"));
        assert_eq!(merged.get(ServiceName::Redis), Some("5.0"));
    }
}
