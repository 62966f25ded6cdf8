//! Shader graph authoring structure
//!
//! The graph is mutated only through builder operations; `connect` refuses
//! any edge that would close a cycle, so every snapshot handed to the
//! compiler is a DAG by construction.

use crate::graph::node::ShaderNode;
use crate::graph::GraphError;
use std::collections::HashSet;

/// Directed edge between two node sockets.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: String,
    pub from_node: String,
    pub from_output: String,
    pub to_node: String,
    pub to_input: String,
}

/// Mutable node/connection authoring structure.
pub struct ShaderGraph {
    id: String,
    nodes: Vec<ShaderNode>,
    connections: Vec<Connection>,
    next_connection_id: u32,
}

impl ShaderGraph {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            nodes: Vec::new(),
            connections: Vec::new(),
            next_connection_id: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Add a node. Fails if a node with the same id already exists.
    pub fn add_node(&mut self, node: ShaderNode) -> Result<(), GraphError> {
        if self.node(&node.id).is_some() {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut ShaderNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Remove a node and every connection touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<ShaderNode> {
        let index = self.nodes.iter().position(|n| n.id == id)?;
        self.connections
            .retain(|c| c.from_node != id && c.to_node != id);
        Some(self.nodes.remove(index))
    }

    /// Connect `from_node.from_output` to `to_node.to_input`.
    ///
    /// Both nodes must exist, and the edge must not close a cycle: if
    /// `to_node` can already reach `from_node` through existing edges the
    /// connection is rejected and the graph is left untouched.
    pub fn connect(
        &mut self,
        from_node: &str,
        from_output: &str,
        to_node: &str,
        to_input: &str,
    ) -> Result<String, GraphError> {
        if self.node(from_node).is_none() {
            return Err(GraphError::NodeNotFound(from_node.to_string()));
        }
        if self.node(to_node).is_none() {
            return Err(GraphError::NodeNotFound(to_node.to_string()));
        }
        if self.reaches(to_node, from_node) {
            return Err(GraphError::WouldCycle {
                from: from_node.to_string(),
                to: to_node.to_string(),
            });
        }

        let id = format!("conn_{}", self.next_connection_id);
        self.next_connection_id += 1;
        self.connections.push(Connection {
            id: id.clone(),
            from_node: from_node.to_string(),
            from_output: from_output.to_string(),
            to_node: to_node.to_string(),
            to_input: to_input.to_string(),
        });
        Ok(id)
    }

    /// Remove a connection by id. Returns true if it existed.
    pub fn disconnect(&mut self, connection_id: &str) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != connection_id);
        self.connections.len() != before
    }

    /// Whether `start` can reach `target` through existing edges.
    fn reaches(&self, start: &str, target: &str) -> bool {
        if start == target {
            return true;
        }
        let mut visited: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&str> = vec![start];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            for conn in self.connections.iter().filter(|c| c.from_node == current) {
                if conn.to_node == target {
                    return true;
                }
                stack.push(&conn.to_node);
            }
        }
        false
    }

    /// Read-only snapshot for the compiler. Nodes keep insertion order.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            graph_id: self.id.clone(),
            nodes: self.nodes.clone(),
            connections: self.connections.clone(),
        }
    }
}

/// Immutable view of a graph at one point in time.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    pub graph_id: String,
    pub nodes: Vec<ShaderNode>,
    pub connections: Vec<Connection>,
}

impl GraphSnapshot {
    pub fn node(&self, id: &str) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Connections feeding into `node_id`, in authoring order.
    pub fn incoming(&self, node_id: &str) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|c| c.to_node == node_id)
            .collect()
    }
}
