//! Execution records produced by estimators and the simulator
//!
//! A [`LayerExecution`] is the structured result for one layer; a
//! [`SimulationResult`] rolls an ordered stack of them into totals and the
//! bottleneck. Both are freshly allocated per run and never mutated after
//! creation.

use std::collections::BTreeMap;
use std::fmt;

use crate::layer::LayerKind;
use crate::model::Bottleneck;
use crate::ops::OpCost;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-fused-op contribution recorded into a layer's breakdown
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OpBreakdown {
    pub flops: f64,
    pub bytes_read: f64,
    pub bytes_written: f64,
    pub compute_time_ms: f64,
    pub memory_time_ms: f64,
}

/// Itemized detail behind a layer estimate
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExecutionBreakdown {
    /// Per-op costs and times, keyed by catalog op name
    pub ops: BTreeMap<String, OpBreakdown>,
    /// Reason the learned backend was bypassed, when the fallback fired
    pub fallback: Option<String>,
}

impl ExecutionBreakdown {
    /// Record one fused op with its standalone times.
    pub fn insert_op(&mut self, cost: &OpCost, compute_time_ms: f64, memory_time_ms: f64) {
        self.ops.insert(
            cost.name.to_string(),
            OpBreakdown {
                flops: cost.flops,
                bytes_read: cost.bytes_read,
                bytes_written: cost.bytes_written,
                compute_time_ms,
                memory_time_ms,
            },
        );
    }
}

/// Structured estimate for one layer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerExecution {
    pub layer_name: String,
    pub layer_type: LayerKind,
    pub flops: f64,
    pub bytes_read: f64,
    pub bytes_written: f64,
    pub compute_time_ms: f64,
    pub memory_time_ms: f64,
    /// Always max(compute_time_ms, memory_time_ms)
    pub dominant_latency_ms: f64,
    /// Stable alias for dominant_latency_ms kept for downstream consumers
    pub estimated_execution_time_ms: f64,
    pub breakdown: ExecutionBreakdown,
    /// Flattened shape and runtime scalars with a stable key set per layer
    /// type; the learned backend consumes these
    pub features: BTreeMap<String, f64>,
}

impl LayerExecution {
    /// Bytes moved in both directions.
    pub fn total_bytes(&self) -> f64 {
        self.bytes_read + self.bytes_written
    }

    /// Which side of the roofline this layer landed on.
    pub fn bottleneck(&self) -> Bottleneck {
        Bottleneck::from_times(self.compute_time_ms, self.memory_time_ms)
    }
}

/// Aggregate output for an end-to-end simulation run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimulationResult {
    /// Per-layer estimates in input order
    pub layers: Vec<LayerExecution>,
    /// Sum of dominant latencies (sequential execution)
    pub total_latency_ms: f64,
    pub total_flops: f64,
    /// Largest single-layer bytes_read + bytes_written
    pub peak_memory_bytes: f64,
    /// Layer with the largest dominant latency; earliest occurrence wins
    /// ties, `None` for an empty run
    pub bottleneck_layer: Option<String>,
}

impl SimulationResult {
    /// One-line report of the run.
    pub fn summary(&self) -> String {
        format!(
            "Total: {:.3} ms | GFLOPs: {:.3} | Peak memory: {:.3} GB | Layers: {} | Bottleneck: {}",
            self.total_latency_ms,
            self.total_flops / 1e9,
            self.peak_memory_bytes / 1e9,
            self.layers.len(),
            self.bottleneck_layer.as_deref().unwrap_or("none"),
        )
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
