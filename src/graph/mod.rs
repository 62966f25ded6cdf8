//! Graph authoring model
//!
//! Nodes come out of a [`NodeRegistry`], get wired together in a
//! [`ShaderGraph`], and leave as an immutable [`GraphSnapshot`] for the
//! compiler.

pub mod graph;
pub mod node;
pub mod registry;

pub use graph::{Connection, GraphSnapshot, ShaderGraph};
pub use node::{
    MergeCategory, NodeKind, NodeParam, ShaderFragment, ShaderNode, Socket, SocketType,
};
pub use registry::{NodeFactory, NodeRegistry};

use thiserror::Error;

/// Errors raised by graph authoring and registry lookups.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("node type '{0}' is not registered")]
    NotRegistered(String),
    #[error("node id '{0}' already exists in the graph")]
    DuplicateNode(String),
    #[error("node '{0}' not found")]
    NodeNotFound(String),
    #[error("connecting '{from}' to '{to}' would create a cycle")]
    WouldCycle { from: String, to: String },
}
