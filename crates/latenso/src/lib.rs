//! # Latenso - Analytic Latency Estimation for LLM Serving
//!
//! **Execution-free latency profiles** for transformer decoder stacks:
//! fused-op FLOP/byte counting, a roofline hardware timing model, and
//! whole-stack aggregation with bottleneck attribution.
//!
//! This is the **meta crate** that re-exports all Latenso components for
//! convenient access.
//!
//! ## Quick Start
//!
//! ```
//! use latenso::prelude::*;
//!
//! let layers = vec![
//!     LayerConfig::attention("attn_0", 0, Default::default()),
//!     LayerConfig::ffn("mlp_0", 0, Default::default()),
//! ];
//!
//! let result = simulate_analytic(
//!     &layers,
//!     &HardwareSpec::a100_sxm(),
//!     &RuntimeShape::new(8, 2048),
//! )
//! .unwrap();
//!
//! assert_eq!(result.layers.len(), 2);
//! println!("{}", result.summary());
//! ```
//!
//! ## Components
//!
//! ### Core Data Model ([`core`])
//!
//! Fused-op cost records, hardware specs and the roofline timing model,
//! layer and runtime shapes, execution records, the error taxonomy.
//!
//! ```
//! use latenso::core::{HardwareModel, HardwareSpec};
//!
//! let model = HardwareModel::new(HardwareSpec::h100_sxm()).unwrap();
//! let gemm = latenso::core::ops::ffn_up_proj(8, 2048, 4096, 16384, 16);
//! let (compute_ms, memory_ms) =
//!     model.time_for(gemm.flops, gemm.bytes_read, gemm.bytes_written, 1);
//! assert!(compute_ms > 0.0 && memory_ms > 0.0);
//! ```
//!
//! ### Estimators and Simulation ([`sim`])
//!
//! Per-kind analytic estimators, the estimator backend seam, the learned
//! backend with its plausibility envelope, the fallback decorator, and
//! stack aggregation.
//!
//! ```
//! use latenso::core::{HardwareSpec, LayerConfig, MoeShape, RuntimeShape};
//! use latenso::sim::{simulate, AnalyticBackend};
//!
//! let moe = LayerConfig::moe(
//!     "moe_0",
//!     0,
//!     MoeShape {
//!         d_model: 4096,
//!         expert_hidden: 14336,
//!         num_experts: 8,
//!         top_k: 2,
//!         ..Default::default()
//!     },
//! );
//! let result = simulate(
//!     &[moe],
//!     &HardwareSpec::mi300x(),
//!     &RuntimeShape::new(4, 1024),
//!     &AnalyticBackend,
//! )
//! .unwrap();
//! assert_eq!(result.bottleneck_layer.as_deref(), Some("moe_0"));
//! ```
//!
//! ### Scenarios and Reports ([`scenario`])
//!
//! YAML scenario loading with file references and overrides, fixed-width
//! table rendering, JSON result dumps.
//!
//! ```ignore
//! use latenso::prelude::*;
//!
//! let scenario = load_scenario("scenarios/afd_decode.yaml")?;
//! let result = simulate_analytic(&scenario.layers, &scenario.hardware, &runtime)?;
//! println!("{}", render_dense_table(&result));
//! ```

#![deny(warnings)]

// Re-export all components
pub use latenso_core as core;
pub use latenso_scenario as scenario;
pub use latenso_sim as sim;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! # Example
    //!
    //! ```
    //! use latenso::prelude::*;
    //!
    //! let spec = HardwareSpec::a100_sxm();
    //! assert_eq!(spec.peak_tflops, 312.0);
    //! ```

    // Core types
    pub use crate::core::{
        Bottleneck, EstimateError, EstimateResult, HardwareModel, HardwareSpec, LayerConfig,
        LayerExecution, LayerKind, RuntimeShape, SimulationResult,
    };

    // Layer shapes
    pub use crate::core::{AttentionShape, CommShape, FfnShape, MoeShape};

    // Backends and simulation
    pub use crate::sim::{
        simulate, simulate_analytic, AnalyticBackend, EstimatorBackend, FallbackBackend,
        LearnedBackend, LearnedLatencyModel,
    };

    // Scenario loading and reports
    pub use crate::scenario::{
        load_scenario, render_dense_table, render_expert_parallel_table, render_totals,
        result_to_json, Scenario,
    };
}
