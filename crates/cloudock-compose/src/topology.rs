//! The compiled topology: ordered service definitions plus named volumes.

use std::collections::BTreeMap;

use cloudock_common::constants::COMPOSE_FORMAT_VERSION;
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;
use crate::factory::ServiceDefinition;
use crate::graph::DependencyGraph;

/// A named persistent volume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VolumeDefinition {
    /// Driver options; empty for an anonymous local volume.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub driver_opts: BTreeMap<String, String>,
}

impl VolumeDefinition {
    /// A volume bind-mounting `device` from the host.
    #[must_use]
    pub fn bind(device: &str) -> Self {
        let driver_opts = BTreeMap::from([
            ("type".to_string(), "none".to_string()),
            ("device".to_string(), device.to_string()),
            ("o".to_string(), "bind".to_string()),
        ]);
        Self { driver_opts }
    }
}

/// The complete deployable service graph.
///
/// Serializes as a compose document with `version`, `services`, and
/// `volumes`, preserving insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    version: &'static str,
    services: IndexMap<String, ServiceDefinition>,
    volumes: IndexMap<String, VolumeDefinition>,
}

impl Topology {
    /// Returns the services in insertion order.
    #[must_use]
    pub const fn services(&self) -> &IndexMap<String, ServiceDefinition> {
        &self.services
    }

    /// Returns the named volumes in insertion order.
    #[must_use]
    pub const fn volumes(&self) -> &IndexMap<String, VolumeDefinition> {
        &self.volumes
    }

    /// Looks up a service by name.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.get(name)
    }

    /// Returns whether a service named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Service names in insertion order.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Returns the service names ordered dependencies-first.
    ///
    /// # Errors
    ///
    /// Returns an error if a dependency is undefined or the edges form a cycle.
    pub fn startup_order(&self) -> Result<Vec<String>> {
        dependency_graph(&self.services)?.resolve_order()
    }
}

fn dependency_graph(services: &IndexMap<String, ServiceDefinition>) -> Result<DependencyGraph> {
    let mut graph = DependencyGraph::new();
    for name in services.keys() {
        let _ = graph.add_service(name);
    }
    for (name, service) in services {
        for dependency in &service.depends_on {
            graph.add_dependency(name, dependency)?;
        }
    }
    Ok(graph)
}

/// Accumulates services and volumes, then checks the dependency graph.
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    services: IndexMap<String, ServiceDefinition>,
    volumes: IndexMap<String, VolumeDefinition>,
}

impl TopologyBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the service `name`.
    pub fn insert(&mut self, name: &str, mut definition: ServiceDefinition) {
        definition.name = name.to_string();
        let _ = self.services.insert(name.to_string(), definition);
    }

    /// Adds (or replaces) the volume `name`.
    pub fn volume(&mut self, name: &str, definition: VolumeDefinition) {
        let _ = self.volumes.insert(name.to_string(), definition);
    }

    /// Names of the services added so far, in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// Finalizes the topology.
    ///
    /// # Errors
    ///
    /// Returns an error if a `depends_on` entry names a missing service or
    /// the dependency edges form a cycle.
    pub fn build(self) -> Result<Topology> {
        let order = dependency_graph(&self.services)?.resolve_order()?;
        tracing::debug!(?order, "topology dependency graph verified");
        Ok(Topology {
            version: COMPOSE_FORMAT_VERSION,
            services: self.services,
            volumes: self.volumes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use crate::factory::{ServiceKind, ServiceOptions, create};

    #[test]
    fn insert_assigns_names_and_keeps_order() {
        let mut builder = TopologyBuilder::new();
        builder.insert("db", create(ServiceKind::Db, "10.2", ServiceOptions::new()));
        builder.insert("redis", create(ServiceKind::Redis, "5.0", ServiceOptions::new()));
        let topology = builder.build().expect("build");
        assert_eq!(topology.service_names().collect::<Vec<_>>(), vec!["db", "redis"]);
        assert_eq!(topology.service("redis").map(|s| s.name.as_str()), Some("redis"));
    }

    #[test]
    fn dangling_dependency_fails_the_build() {
        let mut builder = TopologyBuilder::new();
        builder.insert(
            "web",
            create(ServiceKind::Nginx, "1.9", ServiceOptions::new().depends_on(["fpm"])),
        );
        assert!(matches!(
            builder.build(),
            Err(ConfigurationError::UnknownDependency { .. })
        ));
    }

    #[test]
    fn cyclic_dependencies_fail_the_build() {
        let mut builder = TopologyBuilder::new();
        builder.insert(
            "a",
            create(ServiceKind::Node, "10", ServiceOptions::new().depends_on(["b"])),
        );
        builder.insert(
            "b",
            create(ServiceKind::Node, "10", ServiceOptions::new().depends_on(["a"])),
        );
        assert_eq!(builder.build(), Err(ConfigurationError::DependencyCycle));
    }

    #[test]
    fn bind_volume_serializes_driver_options() {
        let json = serde_json::to_value(VolumeDefinition::bind("${PWD}")).expect("json");
        assert_eq!(json["driver_opts"]["device"], "${PWD}");
        assert_eq!(json["driver_opts"]["o"], "bind");
        assert_eq!(json["driver_opts"]["type"], "none");
    }

    #[test]
    fn anonymous_volume_serializes_as_empty_map() {
        let json = serde_json::to_value(VolumeDefinition::default()).expect("json");
        assert_eq!(json, serde_json::json!({}));
    }
}
