//! # latenso-sim
//!
//! Layer estimators, estimator backends, and stack aggregation for Latenso.
//!
//! This crate turns static layer configurations and a runtime shape into
//! per-layer latency estimates and rolls an ordered stack of them into an
//! end-to-end simulation profile, all without executing any model.
//!
//! ## Features
//!
//! - **Analytic Estimators**: Closed-form roofline estimates for attention,
//!   feed-forward, mixture-of-experts, and communication layers
//! - **Backend Seam**: The [`EstimatorBackend`] trait keeps the simulator
//!   agnostic to where estimates come from
//! - **Learned Backend**: Pre-trained per-kind linear regressors override the
//!   analytic times, guarded by a plausibility envelope
//! - **Analytic Fallback**: A decorator that degrades backend failures to the
//!   analytic estimate instead of aborting the run
//! - **Aggregation**: Ordered-sum latency totals, peak memory, and bottleneck
//!   layer identification
//!
//! ## Quick Start
//!
//! ```
//! use latenso_core::{FfnShape, HardwareSpec, LayerConfig, RuntimeShape};
//! use latenso_sim::simulate_analytic;
//!
//! let layers = vec![
//!     LayerConfig::attention("attn_0", 0, Default::default()),
//!     LayerConfig::ffn(
//!         "ffn_0",
//!         0,
//!         FfnShape {
//!             d_model: 4096,
//!             d_ff: 16384,
//!             ..Default::default()
//!         },
//!     ),
//! ];
//!
//! let result = simulate_analytic(
//!     &layers,
//!     &HardwareSpec::h100_sxm(),
//!     &RuntimeShape::new(8, 2048),
//! )
//! .unwrap();
//!
//! assert_eq!(result.layers.len(), 2);
//! assert!(result.total_latency_ms > 0.0);
//! println!("{}", result.summary());
//! ```
//!
//! ## Backends
//!
//! [`AnalyticBackend`] is the default path: pure roofline arithmetic, always
//! available. [`LearnedBackend`] consumes a [`LearnedLatencyModel`] of trained
//! regressor weights and replaces only the time fields of each estimate.
//! Wrapping either in [`FallbackBackend`] guarantees a run never fails for
//! backend reasons:
//!
//! ```
//! use latenso_sim::{FallbackBackend, LearnedBackend, LearnedLatencyModel};
//!
//! // No kinds trained: every layer falls back to the analytic estimate.
//! let backend = FallbackBackend::new(LearnedBackend::new(LearnedLatencyModel::default()));
//! ```

#![deny(warnings)]

mod attention;
mod communication;
mod ffn;
mod moe;

pub mod backend;
pub mod learned;
pub mod simulator;


pub use backend::{AnalyticBackend, EstimatorBackend, FallbackBackend};
pub use learned::{
    KindModel, LearnedBackend, LearnedLatencyModel, LinearModel, PlausibilityEnvelope,
};
pub use simulator::{simulate, simulate_analytic};
