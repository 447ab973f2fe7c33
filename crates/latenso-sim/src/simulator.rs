//! Stack aggregation
//!
//! [`simulate`] walks an ordered layer list exactly once and rolls the
//! per-layer estimates into a [`SimulationResult`]. Layers are assumed to
//! execute sequentially, so the end-to-end latency is the plain sum of the
//! per-layer dominant latencies. Peak memory is the largest single-layer
//! byte total; communication payloads count the same as compute-layer bytes.
//!
//! Any layer failure aborts the whole run with the failing layer's index and
//! name attached; there is no partial result.

use tracing::debug;

use latenso_core::{
    EstimateError, EstimateResult, HardwareModel, HardwareSpec, LayerConfig, RuntimeShape,
    SimulationResult,
};

use crate::backend::{AnalyticBackend, EstimatorBackend};

/// Estimate an ordered layer stack end to end.
pub fn simulate(
    layers: &[LayerConfig],
    hardware: &HardwareSpec,
    runtime: &RuntimeShape,
    backend: &dyn EstimatorBackend,
) -> EstimateResult<SimulationResult> {
    let model = HardwareModel::new(hardware.clone())?;
    runtime.validate()?;

    let mut executions = Vec::with_capacity(layers.len());
    let mut total_latency_ms = 0.0;
    let mut total_flops = 0.0;
    let mut peak_memory_bytes: f64 = 0.0;
    let mut bottleneck: Option<(String, f64)> = None;

    for (index, config) in layers.iter().enumerate() {
        let execution = backend
            .estimate(config, runtime, &model)
            .map_err(|source| EstimateError::layer_failed(index, config.name(), source))?;

        debug!(
            layer = execution.layer_name.as_str(),
            kind = %execution.layer_type,
            latency_ms = execution.dominant_latency_ms,
            bound = %execution.bottleneck(),
            "estimated layer"
        );

        total_latency_ms += execution.dominant_latency_ms;
        total_flops += execution.flops;
        peak_memory_bytes = peak_memory_bytes.max(execution.total_bytes());

        // Strictly greater, so the first occurrence wins ties.
        let dominates = match &bottleneck {
            Some((_, current)) => execution.dominant_latency_ms > *current,
            None => true,
        };
        if dominates {
            bottleneck = Some((execution.layer_name.clone(), execution.dominant_latency_ms));
        }

        executions.push(execution);
    }

    Ok(SimulationResult {
        layers: executions,
        total_latency_ms,
        total_flops,
        peak_memory_bytes,
        bottleneck_layer: bottleneck.map(|(name, _)| name),
    })
}

/// [`simulate`] with the analytic backend wired in.
pub fn simulate_analytic(
    layers: &[LayerConfig],
    hardware: &HardwareSpec,
    runtime: &RuntimeShape,
) -> EstimateResult<SimulationResult> {
    simulate(layers, hardware, runtime, &AnalyticBackend)
}
