//! Shading node definitions

use crate::backend::types::UniformValue;
use std::collections::BTreeMap;

/// Closed set of node roles the compiler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Provides pixels (video frame, image, generator). Emits no pass.
    Source,
    /// Single-input filter over upstream pixels.
    Effect,
    /// Combines two or more inputs.
    Blend,
    /// Geometric remapping (translate/scale/rotate).
    Transform,
    /// Terminal marker; repoints the final pass at the screen.
    Output,
}

/// Classification used to decide pass-fusion eligibility.
///
/// Passes fold together only within one category; an uncategorized pass
/// never merges, which keeps unknown node types safe by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeCategory {
    ColorCorrection,
    Blur,
    Blend,
    Transform,
    Uncategorized,
}

impl MergeCategory {
    pub fn can_merge_with(&self, other: MergeCategory) -> bool {
        *self != MergeCategory::Uncategorized && *self == other
    }
}

/// Socket value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketType {
    Texture,
    Float,
    Color,
}

/// Named input or output connection point on a node.
#[derive(Debug, Clone)]
pub struct Socket {
    pub name: String,
    pub ty: SocketType,
    pub required: bool,
}

impl Socket {
    pub fn texture(name: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            ty: SocketType::Texture,
            required,
        }
    }
}

/// Parameter value with optional bounds. Setting a float outside its
/// bounds clamps rather than errors.
#[derive(Debug, Clone)]
pub struct NodeParam {
    pub value: UniformValue,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl NodeParam {
    pub fn float(value: f32, min: f32, max: f32) -> Self {
        Self {
            value: UniformValue::Float(value),
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn unbounded(value: UniformValue) -> Self {
        Self {
            value,
            min: None,
            max: None,
        }
    }

    pub fn set(&mut self, value: UniformValue) {
        self.value = match (value, self.min, self.max) {
            (UniformValue::Float(v), min, max) => {
                let v = min.map_or(v, |m| v.max(m));
                let v = max.map_or(v, |m| v.min(m));
                UniformValue::Float(v)
            }
            (other, _, _) => other,
        };
    }
}

/// Opaque shader source attached to a node. The engine concatenates and
/// forwards this text, it never parses it.
#[derive(Debug, Clone)]
pub struct ShaderFragment {
    /// Uniform declaration block, prepended to the composed shader.
    pub uniforms: String,
    /// Function body/bodies implementing the node.
    pub code: String,
    /// Entry point name within `code`.
    pub entry_point: String,
}

/// One operation in a shader graph.
#[derive(Debug, Clone)]
pub struct ShaderNode {
    pub id: String,
    pub kind: NodeKind,
    pub category: MergeCategory,
    pub inputs: Vec<Socket>,
    pub outputs: Vec<Socket>,
    pub params: BTreeMap<String, NodeParam>,
    pub fragment: Option<ShaderFragment>,
}

impl ShaderNode {
    pub fn new(id: &str, kind: NodeKind, category: MergeCategory) -> Self {
        Self {
            id: id.to_string(),
            kind,
            category,
            inputs: Vec::new(),
            outputs: Vec::new(),
            params: BTreeMap::new(),
            fragment: None,
        }
    }

    pub fn with_input(mut self, socket: Socket) -> Self {
        self.inputs.push(socket);
        self
    }

    pub fn with_output(mut self, socket: Socket) -> Self {
        self.outputs.push(socket);
        self
    }

    pub fn with_param(mut self, key: &str, param: NodeParam) -> Self {
        self.params.insert(key.to_string(), param);
        self
    }

    pub fn with_fragment(mut self, fragment: ShaderFragment) -> Self {
        self.fragment = Some(fragment);
        self
    }

    /// Set a parameter's current value, respecting its bounds. Returns
    /// false if the key is unknown.
    pub fn set_param(&mut self, key: &str, value: UniformValue) -> bool {
        match self.params.get_mut(key) {
            Some(param) => {
                param.set(value);
                true
            }
            None => false,
        }
    }

    /// Flattened `{param key: current value}` map, as handed to a pass.
    pub fn uniform_values(&self) -> BTreeMap<String, UniformValue> {
        self.params
            .iter()
            .map(|(k, p)| (k.clone(), p.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_set_clamps_floats() {
        let mut param = NodeParam::float(0.5, 0.0, 1.0);
        param.set(UniformValue::Float(2.0));
        assert_eq!(param.value, UniformValue::Float(1.0));
        param.set(UniformValue::Float(-3.0));
        assert_eq!(param.value, UniformValue::Float(0.0));
    }

    #[test]
    fn uncategorized_never_merges() {
        assert!(!MergeCategory::Uncategorized.can_merge_with(MergeCategory::Uncategorized));
        assert!(MergeCategory::ColorCorrection.can_merge_with(MergeCategory::ColorCorrection));
        assert!(!MergeCategory::ColorCorrection.can_merge_with(MergeCategory::Transform));
    }

    #[test]
    fn set_param_unknown_key() {
        let mut node = ShaderNode::new("n1", NodeKind::Effect, MergeCategory::ColorCorrection);
        assert!(!node.set_param("missing", UniformValue::Float(1.0)));
    }
}
