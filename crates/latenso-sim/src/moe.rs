//! Analytic mixture-of-experts estimator
//!
//! Router gating, top-k selection, the expert FFN scaled by the active
//! token-expert pair count, and the all-to-all dispatch of the routed
//! activations. The pair count is an expectation and may be fractional;
//! `RuntimeShape::tokens_per_expert` replaces it with a per-expert load
//! (pairs = tokens_per_expert × num_experts) for expert-parallel studies.
//!
//! Dispatch traffic is charged against HBM bandwidth here; a standalone
//! communication layer is the place to price interconnect-bound transfers.

use std::collections::BTreeMap;

use latenso_core::ops;
use latenso_core::{EstimateResult, HardwareModel, LayerExecution, LayerKind, MoeShape, RuntimeShape};

use crate::backend::execution_from_ops;

pub(crate) fn estimate(
    name: &str,
    layer_id: u32,
    shape: &MoeShape,
    runtime: &RuntimeShape,
    model: &HardwareModel,
) -> EstimateResult<LayerExecution> {
    shape.validate()?;
    runtime.validate()?;

    let tokens = runtime.tokens();
    let active_pairs = match runtime.tokens_per_expert {
        Some(per_expert) => per_expert * shape.num_experts as f64,
        None => tokens as f64 * shape.resolved_avg_experts_per_token(),
    };

    let bytes_per_elem = shape.dtype_bits as f64 / 8.0;
    let dispatch_bytes = active_pairs * shape.d_model as f64 * bytes_per_elem
        / shape.num_groups as f64;

    let op_costs = vec![
        ops::moe_router_gating(tokens, shape.num_experts, shape.dtype_bits),
        ops::moe_topk_select(tokens, shape.num_experts, shape.top_k, shape.dtype_bits)?,
        ops::moe_expert_forward(
            active_pairs,
            shape.d_model,
            shape.expert_hidden,
            shape.dtype_bits,
        ),
        ops::all_to_all(dispatch_bytes),
    ];

    let mut features = BTreeMap::new();
    features.insert("d_model".to_string(), shape.d_model as f64);
    features.insert("expert_hidden".to_string(), shape.expert_hidden as f64);
    features.insert("num_experts".to_string(), shape.num_experts as f64);
    features.insert("top_k".to_string(), shape.top_k as f64);
    // Effective routing density: under the tokens_per_expert override this is
    // pairs / tokens, not the configured average.
    features.insert(
        "avg_experts_per_token".to_string(),
        active_pairs / tokens as f64,
    );
    features.insert("num_groups".to_string(), shape.num_groups as f64);
    features.insert("batch".to_string(), runtime.batch_size as f64);
    features.insert("seq".to_string(), runtime.seq_len as f64);
    features.insert("dtype_bits".to_string(), shape.dtype_bits as f64);
    features.insert("layer_id".to_string(), layer_id as f64);

    Ok(execution_from_ops(
        name,
        LayerKind::Moe,
        &op_costs,
        features,
        model,
    ))
}
