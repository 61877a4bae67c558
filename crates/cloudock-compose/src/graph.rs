//! Dependency graph management using `petgraph`.
//!
//! Builds a directed graph from `depends_on` edges and resolves the order
//! in which services must start.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::error::{ConfigurationError, Result};

/// A startup dependency graph of services.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: petgraph::Graph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: petgraph::Graph::new(),
            nodes: HashMap::new(),
        }
    }

    /// Adds a service node, returning the existing node if already present.
    pub fn add_service(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        let _ = self.nodes.insert(name.to_string(), idx);
        idx
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownDependency`] if either service
    /// has not been added.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) -> Result<()> {
        let unknown = || ConfigurationError::UnknownDependency {
            service: dependent.to_string(),
            dependency: dependency.to_string(),
        };
        let from = *self.nodes.get(dependency).ok_or_else(unknown)?;
        let to = *self.nodes.get(dependent).ok_or_else(unknown)?;
        // Edges point from dependency to dependent so toposort yields dependencies first.
        let _ = self.graph.add_edge(from, to, ());
        Ok(())
    }

    /// Returns the services ordered so that every dependency precedes its dependents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DependencyCycle`] if the graph contains cycles.
    pub fn resolve_order(&self) -> Result<Vec<String>> {
        let indices = petgraph::algo::toposort(&self.graph, None)
            .map_err(|_cycle| ConfigurationError::DependencyCycle)?;
        Ok(indices
            .iter()
            .filter_map(|&idx| self.graph.node_weight(idx).cloned())
            .collect())
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
