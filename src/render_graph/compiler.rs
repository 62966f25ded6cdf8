//! Graph-to-pass-list compiler
//!
//! Lowers a [`GraphSnapshot`] into an ordered [`CompiledPass`] list. The
//! builder already refuses cyclic edges; the topological sort here repeats
//! the check as defense in depth, since snapshots can also be constructed
//! by hand.

use crate::graph::{GraphSnapshot, MergeCategory, NodeKind, ShaderNode};
use crate::render_graph::pass::{CompiledPass, SCREEN_OUTPUT};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised during compilation.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("cycle detected at node '{0}'")]
    CycleDetected(String),
}

/// Pass-through shader used when a graph is just source -> output with no
/// processing in between; keeps the executor from receiving an empty plan
/// for a non-empty graph.
const BLIT_SHADER: &str = "\
fn blit(color: vec4<f32>) -> vec4<f32> {
    return color;
}
";

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Visited,
}

/// Compile a graph snapshot into an ordered pass list.
///
/// Source nodes emit no pass and become the upstream reference for their
/// consumers. Effect, blend, and transform nodes each emit one pass whose
/// output is a fresh intermediate name. Output nodes repoint the most
/// recent pass at [`SCREEN_OUTPUT`]. An empty graph compiles to an empty
/// list. Connections referencing unknown nodes are tolerated and omitted.
pub fn compile(snapshot: &GraphSnapshot) -> Result<Vec<CompiledPass>, CompileError> {
    let sorted = topo_sort(snapshot)?;

    // Name each node's produced value: a source resolves through the
    // external source table under its own id, a pass through its
    // intermediate output.
    let mut produced: HashMap<String, String> = HashMap::new();
    let mut prev_output: Option<String> = None;
    let mut passes: Vec<CompiledPass> = Vec::new();
    let mut next_intermediate = 0u32;

    for node in &sorted {
        match node.kind {
            NodeKind::Source => {
                produced.insert(node.id.clone(), node.id.clone());
                prev_output = Some(node.id.clone());
            }
            NodeKind::Effect | NodeKind::Blend | NodeKind::Transform => {
                let inputs = resolve_inputs(snapshot, node, &produced, &prev_output);

                let (shader, entry_point) = match &node.fragment {
                    Some(fragment) => (fragment.code.clone(), fragment.entry_point.clone()),
                    None => (String::new(), "main".to_string()),
                };

                let output = format!("intermediate_{}", next_intermediate);
                next_intermediate += 1;

                produced.insert(node.id.clone(), output.clone());
                prev_output = Some(output.clone());

                passes.push(CompiledPass {
                    id: format!("pass_{}", passes.len()),
                    node_ids: vec![node.id.clone()],
                    shader,
                    entry_point,
                    inputs,
                    output,
                    uniforms: node.uniform_values(),
                    category: node.category,
                });
            }
            NodeKind::Output => {
                match passes.last_mut() {
                    Some(last) => last.output = SCREEN_OUTPUT.to_string(),
                    None => {
                        // Bare source -> output graph: synthesize a blit so
                        // the executor always has something to run.
                        let inputs = prev_output.clone().into_iter().collect();
                        passes.push(CompiledPass {
                            id: format!("pass_{}", passes.len()),
                            node_ids: vec![node.id.clone()],
                            shader: BLIT_SHADER.to_string(),
                            entry_point: "blit".to_string(),
                            inputs,
                            output: SCREEN_OUTPUT.to_string(),
                            uniforms: Default::default(),
                            category: MergeCategory::Uncategorized,
                        });
                    }
                }
            }
        }
    }

    log::debug!(
        "compiled graph '{}': {} nodes -> {} passes",
        snapshot.graph_id,
        snapshot.nodes.len(),
        passes.len()
    );
    Ok(passes)
}

fn resolve_inputs(
    snapshot: &GraphSnapshot,
    node: &ShaderNode,
    produced: &HashMap<String, String>,
    prev_output: &Option<String>,
) -> Vec<String> {
    let incoming = snapshot.incoming(&node.id);
    if incoming.is_empty() {
        // No recorded connections: fall back to whatever came before.
        return prev_output.clone().into_iter().collect();
    }

    let mut inputs = Vec::new();
    for conn in incoming {
        match produced.get(&conn.from_node) {
            Some(name) => inputs.push(name.clone()),
            // Dangling reference: tolerated, the input is omitted.
            None => log::debug!(
                "connection '{}' references unknown node '{}', input omitted",
                conn.id,
                conn.from_node
            ),
        }
    }
    inputs
}

/// Depth-first topological sort with visiting/visited marks.
fn topo_sort(snapshot: &GraphSnapshot) -> Result<Vec<ShaderNode>, CompileError> {
    let mut marks: HashMap<String, Mark> = HashMap::new();
    let mut order: Vec<ShaderNode> = Vec::with_capacity(snapshot.nodes.len());

    for node in &snapshot.nodes {
        visit(snapshot, &node.id, &mut marks, &mut order)?;
    }
    Ok(order)
}

fn visit(
    snapshot: &GraphSnapshot,
    id: &str,
    marks: &mut HashMap<String, Mark>,
    order: &mut Vec<ShaderNode>,
) -> Result<(), CompileError> {
    match marks.get(id) {
        Some(Mark::Visited) => return Ok(()),
        Some(Mark::Visiting) => return Err(CompileError::CycleDetected(id.to_string())),
        None => {}
    }
    marks.insert(id.to_string(), Mark::Visiting);

    for conn in snapshot.incoming(id) {
        if snapshot.node(&conn.from_node).is_some() {
            visit(snapshot, &conn.from_node, marks, order)?;
        }
    }

    marks.insert(id.to_string(), Mark::Visited);
    if let Some(node) = snapshot.node(id) {
        order.push(node.clone());
    }
    Ok(())
}
