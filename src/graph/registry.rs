//! Node factory registry
//!
//! A registry is constructed explicitly and passed to whatever builds
//! graphs; there is no process-wide default instance.

use crate::backend::types::UniformValue;
use crate::graph::node::ShaderNode;
use crate::graph::GraphError;
use std::collections::{BTreeMap, HashMap};

/// Factory producing a node from an instance id. Black box beyond the
/// sockets, params, and fragment of the node it returns.
pub type NodeFactory = Box<dyn Fn(&str) -> ShaderNode + Send + Sync>;

/// String-keyed table of node factories.
pub struct NodeRegistry {
    factories: HashMap<String, NodeFactory>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory under `name`. Re-registering replaces the
    /// previous factory; that is allowed but logged, since it usually
    /// means two plugins collide on a name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&str) -> ShaderNode + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            log::warn!("node type '{}' re-registered, replacing previous factory", name);
        }
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    /// Instantiate a node of the given type with `id`, applying any param
    /// overrides on top of the factory defaults.
    pub fn create(
        &self,
        name: &str,
        id: &str,
        params: &BTreeMap<String, UniformValue>,
    ) -> Result<ShaderNode, GraphError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| GraphError::NotRegistered(name.to_string()))?;
        let mut node = factory(id);
        for (key, value) in params {
            if !node.set_param(key, *value) {
                log::debug!("node '{}' has no param '{}', override ignored", name, key);
            }
        }
        Ok(node)
    }

    pub fn has(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered type names, sorted for stable iteration.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove a factory. Returns true if it existed.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }

    pub fn clear(&mut self) {
        self.factories.clear();
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
