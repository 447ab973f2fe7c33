//! Plain-text and JSON rendering of simulation results
//!
//! Two table layouts cover the two workflows: the dense view itemizes
//! compute and memory time per layer with its roofline bound, the
//! expert-parallel view swaps those columns for total bytes moved so
//! dispatch-heavy stacks read at a glance. Numbers are fixed to three
//! decimals in width-12 columns so successive runs diff cleanly.

use anyhow::{Context, Result};

use latenso_core::SimulationResult;

const COLUMN_WIDTH: usize = 12;

/// Per-layer table for the dense serving workflow.
///
/// Columns: layer, type, gflops, compute_ms, memory_ms, latency_ms, bound.
pub fn render_dense_table(result: &SimulationResult) -> String {
    let mut lines = vec![format_row(&[
        "layer".to_string(),
        "type".to_string(),
        "gflops".to_string(),
        "compute_ms".to_string(),
        "memory_ms".to_string(),
        "latency_ms".to_string(),
        "bound".to_string(),
    ])];
    for layer in &result.layers {
        lines.push(format_row(&[
            layer.layer_name.clone(),
            layer.layer_type.to_string(),
            format_giga(layer.flops),
            format_ms(layer.compute_time_ms),
            format_ms(layer.memory_time_ms),
            format_ms(layer.dominant_latency_ms),
            layer.bottleneck().to_string(),
        ]));
    }
    lines.join("\n")
}

/// Per-layer table for the expert-parallel workflow.
///
/// Columns: layer, type, gflops, bytes_gb, latency_ms. Bytes cover both
/// directions, so all-to-all dispatch shows its full traffic.
pub fn render_expert_parallel_table(result: &SimulationResult) -> String {
    let mut lines = vec![format_row(&[
        "layer".to_string(),
        "type".to_string(),
        "gflops".to_string(),
        "bytes_gb".to_string(),
        "latency_ms".to_string(),
    ])];
    for layer in &result.layers {
        lines.push(format_row(&[
            layer.layer_name.clone(),
            layer.layer_type.to_string(),
            format_giga(layer.flops),
            format_giga(layer.total_bytes()),
            format_ms(layer.dominant_latency_ms),
        ]));
    }
    lines.join("\n")
}

/// Aggregate block printed after either table.
pub fn render_totals(result: &SimulationResult) -> String {
    format!(
        "Totals:\n  Total latency (ms): {:.3}\n  Total FLOPs (GFLOPs): {:.3}\n  Peak memory (GB): {:.3}\n  Bottleneck layer: {}",
        result.total_latency_ms,
        result.total_flops / 1e9,
        result.peak_memory_bytes / 1e9,
        result.bottleneck_layer.as_deref().unwrap_or("none"),
    )
}

/// Pretty-printed JSON dump of the full result, breakdowns included.
pub fn result_to_json(result: &SimulationResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize simulation result")
}

fn format_row(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| format!("{cell:>COLUMN_WIDTH$}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_ms(value: f64) -> String {
    format!("{value:8.3}")
}

fn format_giga(value: f64) -> String {
    format!("{:8.3}", value / 1e9)
}
