//! Analytic attention estimator
//!
//! Composes the four attention fused ops, converts the summed totals through
//! the hardware model once, and records per-op detail in the breakdown.

use std::collections::BTreeMap;

use latenso_core::ops;
use latenso_core::{AttentionShape, EstimateResult, HardwareModel, LayerExecution, LayerKind, RuntimeShape};

use crate::backend::execution_from_ops;

pub(crate) fn estimate(
    name: &str,
    layer_id: u32,
    shape: &AttentionShape,
    runtime: &RuntimeShape,
    model: &HardwareModel,
) -> EstimateResult<LayerExecution> {
    shape.validate()?;
    runtime.validate()?;

    let batch = runtime.batch_size;
    let seq = runtime.seq_len;
    let head_dim = shape.resolved_head_dim();
    let qkv_dim = shape.qkv_dim();

    let op_costs = [
        ops::attention_qkv_proj(batch, seq, shape.d_model, qkv_dim, shape.dtype_bits),
        ops::attention_scores(batch, seq, shape.num_heads, head_dim, shape.dtype_bits),
        ops::attention_weighted_sum(batch, seq, shape.num_heads, head_dim, shape.dtype_bits),
        ops::attention_output_proj(batch, seq, shape.d_model, qkv_dim, shape.dtype_bits),
    ];

    let mut features = BTreeMap::new();
    features.insert("d_model".to_string(), shape.d_model as f64);
    features.insert("num_heads".to_string(), shape.num_heads as f64);
    features.insert("batch".to_string(), batch as f64);
    features.insert("seq".to_string(), seq as f64);
    features.insert("dtype_bits".to_string(), shape.dtype_bits as f64);
    features.insert("layer_id".to_string(), layer_id as f64);

    Ok(execution_from_ops(
        name,
        LayerKind::Attention,
        &op_costs,
        features,
        model,
    ))
}
