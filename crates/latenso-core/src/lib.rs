//! # latenso-core
//!
//! Core data model and cost formulas for analytic latency estimation of
//! transformer/MoE inference.
//!
//! This crate provides the foundational building blocks of the Latenso stack:
//!
//! - **Fused-op library** ([`ops`]) — pure shape-to-cost formulas producing
//!   [`OpCost`] records, with no hardware knowledge
//! - **Hardware profiles** ([`HardwareSpec`]) — validated accelerator specs
//!   with named presets and roofline helpers
//! - **Timing model** ([`HardwareModel`]) — converts FLOPs and bytes into
//!   compute/memory milliseconds and classifies the [`Bottleneck`]
//! - **Layer configuration** ([`LayerConfig`]) — a tagged variant over
//!   attention, FFN, MoE, and communication shapes
//! - **Execution records** ([`LayerExecution`], [`SimulationResult`]) — the
//!   structured outputs every estimator emits
//! - **Error taxonomy** ([`EstimateError`]) — configuration, formula,
//!   backend, and aggregation failures
//!
//! ## Core Principles
//!
//! ### Determinism
//!
//! Every formula is a pure function of its inputs: the same shapes and the
//! same hardware profile produce bit-identical estimates across runs and
//! processes. Nothing here executes a model or touches a device.
//!
//! ### Fail fast, never clamp
//!
//! Hardware and layer validation reject out-of-range values at construction
//! time. Zero-sized dimensions are not errors; they price to zero cost.
//!
//! ## Quick Start
//!
//! ```
//! use latenso_core::ops::ffn_up_proj;
//! use latenso_core::{HardwareModel, HardwareSpec};
//!
//! // Price one FFN up-projection on an A100.
//! let model = HardwareModel::new(HardwareSpec::a100_sxm()).unwrap();
//! let cost = ffn_up_proj(8, 4096, 7168, 18432, 16);
//!
//! let (compute_ms, memory_ms) =
//!     model.time_for(cost.flops, cost.bytes_read, cost.bytes_written, 1);
//! let dominant = HardwareModel::dominant_latency_ms(compute_ms, memory_ms);
//! assert!(dominant >= compute_ms && dominant >= memory_ms);
//! ```
//!
//! ## Features
//!
//! - `serde`: Enable serialization/deserialization support on the data model

#![deny(warnings)]

pub mod error;
pub mod execution;
pub mod hardware;
pub mod layer;
pub mod metrics;
pub mod model;
pub mod ops;
pub mod shape;

#[cfg(test)]
mod property_tests;

pub use error::{
    AggregationError, BackendError, ConfigError, EstimateError, EstimateResult, FormulaError,
};
pub use execution::{ExecutionBreakdown, LayerExecution, OpBreakdown, SimulationResult};
pub use hardware::HardwareSpec;
pub use layer::{
    Activation, AttentionShape, CollectivePattern, CommShape, FfnShape, LayerConfig, LayerKind,
    MoeShape,
};
pub use model::{Bottleneck, HardwareModel};
pub use ops::OpCost;
pub use shape::RuntimeShape;
