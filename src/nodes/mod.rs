//! Standard node library
//!
//! Factories for the built-in node types. Each node bundles its sockets,
//! params, and an opaque WGSL-style shader fragment; the engine forwards
//! fragment text to the backend without parsing it.

use crate::graph::{MergeCategory, NodeKind, NodeParam, ShaderFragment, ShaderNode, Socket};
use crate::graph::registry::NodeRegistry;
use glam::Mat4;

fn color_effect(
    id: &str,
    name: &str,
    param: &str,
    default: f32,
    min: f32,
    max: f32,
    code: &str,
) -> ShaderNode {
    ShaderNode::new(id, NodeKind::Effect, MergeCategory::ColorCorrection)
        .with_input(Socket::texture("in", true))
        .with_output(Socket::texture("out", false))
        .with_param(param, NodeParam::float(default, min, max))
        .with_fragment(ShaderFragment {
            uniforms: format!("{}: f32", param),
            code: code.to_string(),
            entry_point: name.to_string(),
        })
}

pub fn source(id: &str) -> ShaderNode {
    ShaderNode::new(id, NodeKind::Source, MergeCategory::Uncategorized)
        .with_output(Socket::texture("out", false))
}

pub fn brightness(id: &str) -> ShaderNode {
    color_effect(
        id,
        "brightness",
        "brightness_amount",
        0.0,
        -1.0,
        1.0,
        "fn brightness(color: vec4<f32>, brightness_amount: f32) -> vec4<f32> {\n    return vec4<f32>(color.rgb + vec3<f32>(brightness_amount), color.a);\n}\n",
    )
}

pub fn contrast(id: &str) -> ShaderNode {
    color_effect(
        id,
        "contrast",
        "contrast_amount",
        1.0,
        0.0,
        2.0,
        "fn contrast(color: vec4<f32>, contrast_amount: f32) -> vec4<f32> {\n    return vec4<f32>((color.rgb - vec3<f32>(0.5)) * contrast_amount + vec3<f32>(0.5), color.a);\n}\n",
    )
}

pub fn saturation(id: &str) -> ShaderNode {
    color_effect(
        id,
        "saturation",
        "saturation_amount",
        1.0,
        0.0,
        2.0,
        "fn saturation(color: vec4<f32>, saturation_amount: f32) -> vec4<f32> {\n    let luma = dot(color.rgb, vec3<f32>(0.2126, 0.7152, 0.0722));\n    return vec4<f32>(mix(vec3<f32>(luma), color.rgb, saturation_amount), color.a);\n}\n",
    )
}

pub fn blur(id: &str) -> ShaderNode {
    ShaderNode::new(id, NodeKind::Effect, MergeCategory::Blur)
        .with_input(Socket::texture("in", true))
        .with_output(Socket::texture("out", false))
        .with_param("blur_radius", NodeParam::float(4.0, 0.0, 64.0))
        .with_fragment(ShaderFragment {
            uniforms: "blur_radius: f32".to_string(),
            code: "fn blur(tex: texture_2d<f32>, uv: vec2<f32>, blur_radius: f32) -> vec4<f32> {\n    // Separable gaussian, horizontal tap loop.\n    var acc = vec4<f32>(0.0);\n    var weight_sum = 0.0;\n    for (var i = -8; i <= 8; i = i + 1) {\n        let w = exp(-f32(i * i) / max(blur_radius, 0.001));\n        acc = acc + sample_at(tex, uv, f32(i)) * w;\n        weight_sum = weight_sum + w;\n    }\n    return acc / weight_sum;\n}\n".to_string(),
            entry_point: "blur".to_string(),
        })
}

pub fn blend(id: &str) -> ShaderNode {
    ShaderNode::new(id, NodeKind::Blend, MergeCategory::Blend)
        .with_input(Socket::texture("base", true))
        .with_input(Socket::texture("overlay", true))
        .with_output(Socket::texture("out", false))
        .with_param("blend_mix", NodeParam::float(0.5, 0.0, 1.0))
        .with_fragment(ShaderFragment {
            uniforms: "blend_mix: f32".to_string(),
            code: "fn blend(base: vec4<f32>, overlay: vec4<f32>, blend_mix: f32) -> vec4<f32> {\n    return mix(base, overlay, blend_mix);\n}\n".to_string(),
            entry_point: "blend".to_string(),
        })
}

pub fn transform(id: &str) -> ShaderNode {
    ShaderNode::new(id, NodeKind::Transform, MergeCategory::Transform)
        .with_input(Socket::texture("in", true))
        .with_output(Socket::texture("out", false))
        .with_param(
            "transform_matrix",
            NodeParam::unbounded(Mat4::IDENTITY.into()),
        )
        .with_fragment(ShaderFragment {
            uniforms: "transform_matrix: mat4x4<f32>".to_string(),
            code: "fn transform_uv(uv: vec2<f32>, transform_matrix: mat4x4<f32>) -> vec2<f32> {\n    let mapped = transform_matrix * vec4<f32>(uv - vec2<f32>(0.5), 0.0, 1.0);\n    return mapped.xy + vec2<f32>(0.5);\n}\n".to_string(),
            entry_point: "transform_uv".to_string(),
        })
}

pub fn output(id: &str) -> ShaderNode {
    ShaderNode::new(id, NodeKind::Output, MergeCategory::Uncategorized)
        .with_input(Socket::texture("in", true))
}

/// Register every built-in factory on a registry.
pub fn register_standard_nodes(registry: &mut NodeRegistry) {
    registry.register("source", source);
    registry.register("brightness", brightness);
    registry.register("contrast", contrast);
    registry.register("saturation", saturation);
    registry.register("blur", blur);
    registry.register("blend", blend);
    registry.register("transform", transform);
    registry.register("output", output);
}
