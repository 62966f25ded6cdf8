//! Pass merger
//!
//! Fuses compatible adjacent passes into one, cutting intermediate render
//! targets and fullscreen draws. Fusion is deliberately conservative: a
//! pass whose output has more than one consumer is never folded away.

use crate::render_graph::pass::CompiledPass;
use std::collections::HashMap;

/// Outcome of a merge run.
#[derive(Debug)]
pub struct MergeResult {
    pub passes: Vec<CompiledPass>,
    pub original_count: usize,
    /// Number of passes folded away: `original_count - passes.len()`.
    pub merged_count: usize,
}

/// Greedy left-to-right fusion over an ordered pass list.
///
/// A candidate folds into the open group iff its sole input is exactly the
/// group's current output, nothing else consumes that output, and both
/// share a merge category. Folding composes shader text, unions node ids
/// and uniforms, keeps the group's inputs, and adopts the candidate's
/// output. Anything else closes the group and opens a new one.
pub fn merge(passes: &[CompiledPass]) -> MergeResult {
    let original_count = passes.len();
    if passes.is_empty() {
        return MergeResult {
            passes: Vec::new(),
            original_count,
            merged_count: 0,
        };
    }

    // Consumer counts decide fan-out: an output read by two passes must
    // stay materialized.
    let mut consumers: HashMap<&str, usize> = HashMap::new();
    for pass in passes {
        for input in &pass.inputs {
            *consumers.entry(input.as_str()).or_insert(0) += 1;
        }
    }

    let mut merged: Vec<CompiledPass> = Vec::new();
    let mut group = passes[0].clone();

    for candidate in &passes[1..] {
        if can_fold(&group, candidate, &consumers) {
            fold(&mut group, candidate);
        } else {
            merged.push(group);
            group = candidate.clone();
        }
    }
    merged.push(group);

    let merged_count = original_count - merged.len();
    if merged_count > 0 {
        log::debug!(
            "merged {} of {} passes ({} remain)",
            merged_count,
            original_count,
            merged.len()
        );
    }
    MergeResult {
        passes: merged,
        original_count,
        merged_count,
    }
}

fn can_fold(
    group: &CompiledPass,
    candidate: &CompiledPass,
    consumers: &HashMap<&str, usize>,
) -> bool {
    candidate.inputs.len() == 1
        && candidate.inputs[0] == group.output
        && consumers.get(group.output.as_str()).copied().unwrap_or(0) == 1
        && group.category.can_merge_with(candidate.category)
}

fn fold(group: &mut CompiledPass, candidate: &CompiledPass) {
    if !group.shader.is_empty() && !candidate.shader.is_empty() {
        group.shader.push_str("\n\n");
    }
    group.shader.push_str(&candidate.shader);
    group.entry_point = candidate.entry_point.clone();
    group.node_ids.extend(candidate.node_ids.iter().cloned());
    for (key, value) in &candidate.uniforms {
        if group.uniforms.insert(key.clone(), *value).is_some() {
            log::debug!("uniform '{}' collided while folding pass '{}'", key, candidate.id);
        }
    }
    group.output = candidate.output.clone();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::UniformValue;
    use crate::graph::MergeCategory;
    use crate::render_graph::pass::SCREEN_OUTPUT;
    use std::collections::BTreeMap;

    fn pass(
        id: &str,
        category: MergeCategory,
        inputs: &[&str],
        output: &str,
        uniform: (&str, f32),
    ) -> CompiledPass {
        let mut uniforms = BTreeMap::new();
        uniforms.insert(uniform.0.to_string(), UniformValue::Float(uniform.1));
        CompiledPass {
            id: id.to_string(),
            node_ids: vec![id.to_string()],
            shader: format!("fn {}() {{ }}", id),
            entry_point: id.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            output: output.to_string(),
            uniforms,
            category,
        }
    }

    fn color_chain() -> Vec<CompiledPass> {
        vec![
            pass(
                "brightness",
                MergeCategory::ColorCorrection,
                &["src"],
                "intermediate_0",
                ("brightness_amount", 0.2),
            ),
            pass(
                "contrast",
                MergeCategory::ColorCorrection,
                &["intermediate_0"],
                "intermediate_1",
                ("contrast_amount", 1.1),
            ),
            pass(
                "saturation",
                MergeCategory::ColorCorrection,
                &["intermediate_1"],
                SCREEN_OUTPUT,
                ("saturation_amount", 0.9),
            ),
        ]
    }

    #[test]
    fn empty_list() {
        let result = merge(&[]);
        assert!(result.passes.is_empty());
        assert_eq!(result.original_count, 0);
        assert_eq!(result.merged_count, 0);
    }

    #[test]
    fn same_category_chain_folds_to_one() {
        let result = merge(&color_chain());
        assert_eq!(result.passes.len(), 1);
        assert_eq!(result.original_count, 3);
        assert_eq!(result.merged_count, 2);

        let fused = &result.passes[0];
        assert_eq!(fused.inputs, vec!["src".to_string()]);
        assert_eq!(fused.output, SCREEN_OUTPUT);
        assert_eq!(
            fused.node_ids,
            vec![
                "brightness".to_string(),
                "contrast".to_string(),
                "saturation".to_string()
            ]
        );
        assert_eq!(fused.uniforms.len(), 3);
        assert!(fused.shader.contains("fn brightness"));
        assert!(fused.shader.contains("fn saturation"));
    }

    #[test]
    fn different_categories_never_merge() {
        let passes = vec![
            pass(
                "brightness",
                MergeCategory::ColorCorrection,
                &["src"],
                "intermediate_0",
                ("amount", 0.2),
            ),
            pass(
                "rotate",
                MergeCategory::Transform,
                &["intermediate_0"],
                SCREEN_OUTPUT,
                ("angle", 0.5),
            ),
        ];
        let result = merge(&passes);
        assert_eq!(result.passes.len(), 2);
        assert_eq!(result.merged_count, 0);
        // Order and uniforms preserved exactly.
        assert_eq!(result.passes[0].id, "brightness");
        assert_eq!(result.passes[1].id, "rotate");
        assert_eq!(
            result.passes[1].uniforms["angle"],
            UniformValue::Float(0.5)
        );
    }

    #[test]
    fn fan_out_blocks_merge() {
        let passes = vec![
            pass(
                "a",
                MergeCategory::ColorCorrection,
                &["src"],
                "intermediate_0",
                ("a_v", 1.0),
            ),
            pass(
                "b",
                MergeCategory::ColorCorrection,
                &["intermediate_0"],
                "intermediate_1",
                ("b_v", 1.0),
            ),
            // Second consumer of intermediate_0.
            pass(
                "c",
                MergeCategory::Blend,
                &["intermediate_1", "intermediate_0"],
                SCREEN_OUTPUT,
                ("c_v", 1.0),
            ),
        ];
        let result = merge(&passes);
        assert_eq!(result.merged_count, 0);
        assert_eq!(result.passes.len(), 3);
    }

    #[test]
    fn multi_input_candidate_never_folds() {
        let passes = vec![
            pass(
                "a",
                MergeCategory::Blend,
                &["src"],
                "intermediate_0",
                ("a_v", 1.0),
            ),
            pass(
                "mix",
                MergeCategory::Blend,
                &["intermediate_0", "overlay"],
                SCREEN_OUTPUT,
                ("mix_v", 0.5),
            ),
        ];
        let result = merge(&passes);
        assert_eq!(result.merged_count, 0);
    }

    #[test]
    fn uncategorized_closes_group() {
        let mut passes = color_chain();
        passes[1].category = MergeCategory::Uncategorized;
        let result = merge(&passes);
        assert_eq!(result.passes.len(), 3);
    }

    #[test]
    fn merge_resumes_after_break() {
        let mut passes = color_chain();
        passes.push(pass(
            "extra",
            MergeCategory::Transform,
            &["other_source"],
            "intermediate_2",
            ("t", 1.0),
        ));
        // First three fold, the transform stays.
        let result = merge(&passes);
        assert_eq!(result.original_count, 4);
        assert_eq!(result.passes.len(), 2);
        assert_eq!(result.merged_count, 2);
    }
}
