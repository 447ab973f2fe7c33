//! Analytic feed-forward estimator
//!
//! Up projection, optional gate projection, elementwise activation, down
//! projection. The gate projection only appears for gated (SwiGLU-style)
//! configurations, so breakdown keys differ between gated and ungated runs
//! while the feature key set stays fixed.

use std::collections::BTreeMap;

use latenso_core::ops;
use latenso_core::{EstimateResult, FfnShape, HardwareModel, LayerExecution, LayerKind, RuntimeShape};

use crate::backend::execution_from_ops;

pub(crate) fn estimate(
    name: &str,
    layer_id: u32,
    shape: &FfnShape,
    runtime: &RuntimeShape,
    model: &HardwareModel,
) -> EstimateResult<LayerExecution> {
    shape.validate()?;
    runtime.validate()?;

    let batch = runtime.batch_size;
    let seq = runtime.seq_len;

    let mut op_costs = vec![ops::ffn_up_proj(
        batch,
        seq,
        shape.d_model,
        shape.d_ff,
        shape.dtype_bits,
    )];
    if shape.gated {
        op_costs.push(ops::ffn_gate_proj(
            batch,
            seq,
            shape.d_model,
            shape.d_ff,
            shape.dtype_bits,
        ));
    }
    op_costs.push(ops::ffn_activation(
        batch,
        seq,
        shape.d_ff,
        shape.activation,
        shape.dtype_bits,
    ));
    op_costs.push(ops::ffn_down_proj(
        batch,
        seq,
        shape.d_model,
        shape.d_ff,
        shape.dtype_bits,
    ));

    let mut features = BTreeMap::new();
    features.insert("d_model".to_string(), shape.d_model as f64);
    features.insert("d_ff".to_string(), shape.d_ff as f64);
    features.insert("gated".to_string(), if shape.gated { 1.0 } else { 0.0 });
    features.insert("batch".to_string(), batch as f64);
    features.insert("seq".to_string(), seq as f64);
    features.insert("dtype_bits".to_string(), shape.dtype_bits as f64);
    features.insert("layer_id".to_string(), layer_id as f64);

    Ok(execution_from_ops(
        name,
        LayerKind::Ffn,
        &op_costs,
        features,
        model,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use latenso_core::{Activation, HardwareSpec};

    fn model() -> HardwareModel {
        HardwareModel::new(HardwareSpec::a100_sxm()).unwrap()
    }

    #[test]
    fn test_ungated_has_three_ops() {
        let shape = FfnShape::default();
        let runtime = RuntimeShape::new(2, 128);
        let execution = estimate("ffn_0", 0, &shape, &runtime, &model()).unwrap();
        assert_eq!(execution.breakdown.ops.len(), 3);
        assert!(execution.breakdown.ops.contains_key("ffn_up_proj"));
        assert!(execution.breakdown.ops.contains_key("ffn_activation"));
        assert!(execution.breakdown.ops.contains_key("ffn_down_proj"));
        assert!(!execution.breakdown.ops.contains_key("ffn_gate_proj"));
    }

    #[test]
    fn test_gated_adds_gate_projection() {
        let ungated = FfnShape::default();
        let gated = FfnShape {
            gated: true,
            ..Default::default()
        };
        let runtime = RuntimeShape::new(2, 128);
        let base = estimate("ffn_0", 0, &ungated, &runtime, &model()).unwrap();
        let with_gate = estimate("ffn_0", 0, &gated, &runtime, &model()).unwrap();

        assert!(with_gate.breakdown.ops.contains_key("ffn_gate_proj"));
        // The gate GEMM mirrors the up projection.
        let up = &with_gate.breakdown.ops["ffn_up_proj"];
        let gate = &with_gate.breakdown.ops["ffn_gate_proj"];
        assert_eq!(gate.flops, up.flops);
        assert_eq!(with_gate.flops, base.flops + up.flops);
    }

    #[test]
    fn test_activation_choice_changes_flops() {
        let relu = FfnShape {
            activation: Activation::Relu,
            ..Default::default()
        };
        let gelu = FfnShape {
            activation: Activation::Gelu,
            ..Default::default()
        };
        let runtime = RuntimeShape::new(2, 128);
        let relu_exec = estimate("ffn_0", 0, &relu, &runtime, &model()).unwrap();
        let gelu_exec = estimate("ffn_0", 0, &gelu, &runtime, &model()).unwrap();
        assert!(gelu_exec.flops > relu_exec.flops);
        // The GEMM pair is unaffected by the activation choice.
        assert_eq!(
            relu_exec.breakdown.ops["ffn_up_proj"].flops,
            gelu_exec.breakdown.ops["ffn_up_proj"].flops
        );
    }

    #[test]
    fn test_feature_keys() {
        let shape = FfnShape::default();
        let runtime = RuntimeShape::new(2, 64);
        let execution = estimate("ffn_1", 1, &shape, &runtime, &model()).unwrap();
        let keys: Vec<&str> = execution.features.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["batch", "d_ff", "d_model", "dtype_bits", "gated", "layer_id", "seq"]
        );
        assert_eq!(execution.features["gated"], 0.0);
    }

    #[test]
    fn test_rejects_zero_d_ff() {
        let shape = FfnShape {
            d_ff: 0,
            ..Default::default()
        };
        let runtime = RuntimeShape::new(2, 64);
        assert!(estimate("ffn_0", 0, &shape, &runtime, &model()).is_err());
    }
}
