//! Estimator backends
//!
//! [`EstimatorBackend`] is the seam between the simulator and whatever
//! produces per-layer estimates. [`AnalyticBackend`] is the closed-form
//! roofline path; [`crate::learned::LearnedBackend`] swaps in regressed
//! times; [`FallbackBackend`] decorates any primary so backend-class
//! failures degrade to the analytic estimate instead of aborting the run.

use std::collections::BTreeMap;

use tracing::warn;

use latenso_core::{
    EstimateResult, ExecutionBreakdown, HardwareModel, LayerConfig, LayerExecution, LayerKind,
    OpCost, RuntimeShape,
};

use crate::{attention, communication, ffn, moe};

/// Produces one [`LayerExecution`] per layer configuration
///
/// Implementations must be pure with respect to their inputs: the same
/// config, runtime, and model always yield the same estimate.
pub trait EstimatorBackend: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Estimate one layer under the given runtime shape and hardware model.
    fn estimate(
        &self,
        config: &LayerConfig,
        runtime: &RuntimeShape,
        model: &HardwareModel,
    ) -> EstimateResult<LayerExecution>;
}

/// Closed-form roofline estimation
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticBackend;

impl EstimatorBackend for AnalyticBackend {
    fn name(&self) -> &str {
        "analytic"
    }

    fn estimate(
        &self,
        config: &LayerConfig,
        runtime: &RuntimeShape,
        model: &HardwareModel,
    ) -> EstimateResult<LayerExecution> {
        estimate_layer(config, runtime, model)
    }
}

/// Dispatch to the analytic estimator for the layer's kind.
pub(crate) fn estimate_layer(
    config: &LayerConfig,
    runtime: &RuntimeShape,
    model: &HardwareModel,
) -> EstimateResult<LayerExecution> {
    match config {
        LayerConfig::Attention {
            name,
            layer_id,
            shape,
        } => attention::estimate(name, *layer_id, shape, runtime, model),
        LayerConfig::Ffn {
            name,
            layer_id,
            shape,
        } => ffn::estimate(name, *layer_id, shape, runtime, model),
        LayerConfig::Moe {
            name,
            layer_id,
            shape,
        } => moe::estimate(name, *layer_id, shape, runtime, model),
        LayerConfig::Communication {
            name,
            layer_id,
            shape,
        } => communication::estimate(name, *layer_id, shape, runtime, model),
    }
}

/// Assemble a [`LayerExecution`] from a compute-style op list.
///
/// FLOPs and bytes are summed across the ops and the SUMMED totals go through
/// the hardware model once; dominant latency is the max over those totals,
/// never a sum of per-op maxima. Per-op standalone times are recorded into
/// the breakdown for attribution only.
pub(crate) fn execution_from_ops(
    name: &str,
    kind: LayerKind,
    op_costs: &[OpCost],
    features: BTreeMap<String, f64>,
    model: &HardwareModel,
) -> LayerExecution {
    let mut flops = 0.0;
    let mut bytes_read = 0.0;
    let mut bytes_written = 0.0;
    let mut breakdown = ExecutionBreakdown::default();

    for cost in op_costs {
        flops += cost.flops;
        bytes_read += cost.bytes_read;
        bytes_written += cost.bytes_written;
        let (op_compute, op_memory) =
            model.time_for(cost.flops, cost.bytes_read, cost.bytes_written, 1);
        breakdown.insert_op(cost, op_compute, op_memory);
    }

    let (compute_time_ms, memory_time_ms) = model.time_for(flops, bytes_read, bytes_written, 1);
    let dominant = HardwareModel::dominant_latency_ms(compute_time_ms, memory_time_ms);

    LayerExecution {
        layer_name: name.to_string(),
        layer_type: kind,
        flops,
        bytes_read,
        bytes_written,
        compute_time_ms,
        memory_time_ms,
        dominant_latency_ms: dominant,
        estimated_execution_time_ms: dominant,
        breakdown,
        features,
    }
}

/// Decorator that degrades backend-class failures to the analytic estimate
///
/// Only [`latenso_core::BackendError`] failures are recovered; configuration
/// and formula errors still abort. The recovery reason is recorded in the
/// layer's breakdown so reports can show which layers fell back.
pub struct FallbackBackend<B> {
    primary: B,
    name: String,
}

impl<B: EstimatorBackend> FallbackBackend<B> {
    pub fn new(primary: B) -> Self {
        let name = format!("{}+fallback", primary.name());
        Self { primary, name }
    }

    /// The wrapped primary backend.
    pub fn primary(&self) -> &B {
        &self.primary
    }
}

impl<B: EstimatorBackend> EstimatorBackend for FallbackBackend<B> {
    fn name(&self) -> &str {
        &self.name
    }

    fn estimate(
        &self,
        config: &LayerConfig,
        runtime: &RuntimeShape,
        model: &HardwareModel,
    ) -> EstimateResult<LayerExecution> {
        match self.primary.estimate(config, runtime, model) {
            Ok(execution) => Ok(execution),
            Err(err) if err.is_backend_error() => {
                warn!(
                    layer = config.name(),
                    backend = self.primary.name(),
                    reason = %err,
                    "falling back to analytic estimate"
                );
                let mut execution = estimate_layer(config, runtime, model)?;
                execution.breakdown.fallback = Some(err.to_string());
                Ok(execution)
            }
            Err(err) => Err(err),
        }
    }
}
