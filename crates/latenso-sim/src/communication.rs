//! Analytic communication estimator
//!
//! A communication layer carries one collective transfer and no arithmetic.
//! The interconnect transfer time occupies the compute slot of the resulting
//! [`LayerExecution`]: the layer is interconnect-bound rather than FLOP-bound,
//! and recording it there keeps the dominant-latency law and bottleneck
//! classification uniform across layer kinds. The memory slot prices the
//! payload through HBM on both sides, like any other op.

use std::collections::BTreeMap;

use latenso_core::metrics::mb_to_bytes;
use latenso_core::ops;
use latenso_core::{
    CollectivePattern, CommShape, EstimateResult, ExecutionBreakdown, HardwareModel,
    LayerExecution, LayerKind, RuntimeShape,
};

pub(crate) fn estimate(
    name: &str,
    layer_id: u32,
    shape: &CommShape,
    runtime: &RuntimeShape,
    model: &HardwareModel,
) -> EstimateResult<LayerExecution> {
    shape.validate()?;
    runtime.validate()?;

    let payload_bytes = mb_to_bytes(shape.payload_mb);
    let cost = match shape.pattern {
        CollectivePattern::AllToAll => ops::all_to_all(payload_bytes),
        CollectivePattern::AllReduce => ops::all_reduce(payload_bytes),
    };

    let interconnect_ms = model.interconnect_time_ms(payload_bytes);
    let memory_ms = model.memory_time_ms(cost.total_bytes());
    let dominant = HardwareModel::dominant_latency_ms(interconnect_ms, memory_ms);

    let mut breakdown = ExecutionBreakdown::default();
    breakdown.insert_op(&cost, interconnect_ms, memory_ms);

    let mut features = BTreeMap::new();
    features.insert("payload_mb".to_string(), shape.payload_mb);
    features.insert("batch".to_string(), runtime.batch_size as f64);
    features.insert("seq".to_string(), runtime.seq_len as f64);
    features.insert("layer_id".to_string(), layer_id as f64);

    Ok(LayerExecution {
        layer_name: name.to_string(),
        layer_type: LayerKind::Communication,
        flops: cost.flops,
        bytes_read: cost.bytes_read,
        bytes_written: cost.bytes_written,
        compute_time_ms: interconnect_ms,
        memory_time_ms: memory_ms,
        dominant_latency_ms: dominant,
        estimated_execution_time_ms: dominant,
        breakdown,
        features,
    })
}
