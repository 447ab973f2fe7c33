//! # latenso-scenario
//!
//! Scenario files and result reports for Latenso.
//!
//! A scenario YAML pins down everything static about a run: the hardware
//! profile and an ordered stack of layer configs, inline or referenced from
//! sibling files. Loading resolves every reference, applies per-layer
//! overrides, and validates each shape, so downstream code only ever sees a
//! well-formed [`Scenario`]. The report side renders a [`SimulationResult`]
//! as fixed-width tables or pretty JSON.
//!
//! [`SimulationResult`]: latenso_core::SimulationResult
//!
//! ## Features
//!
//! - **Scenario Loading**: Hardware and layer configs inline or as relative
//!   file references, with shallow per-layer overrides
//! - **Checkpoint Vocabulary**: Layer shape fields accept the common
//!   checkpoint-config aliases, so real model configs drop in unchanged
//! - **Report Rendering**: Dense and expert-parallel table views plus a
//!   totals block and a raw JSON dump
//!
//! ## Quick Start
//!
//! ```
//! use latenso_core::RuntimeShape;
//! use latenso_scenario::{load_scenario, render_dense_table, render_totals};
//! use latenso_sim::simulate_analytic;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("prefill.yaml");
//! std::fs::write(
//!     &path,
//!     r#"
//! hardware:
//!   name: a100_sxm
//!   peak_tflops: 312.0
//!   memory_bandwidth_gbps: 2039.0
//!   hbm_gb: 80.0
//!   interconnect_gbps: 600.0
//! layers:
//!   - type: attention
//!   - type: ffn
//!     name: mlp
//! "#,
//! )
//! .unwrap();
//!
//! let scenario = load_scenario(&path).unwrap();
//! assert_eq!(scenario.name, "prefill");
//! assert_eq!(scenario.layers[1].name(), "mlp");
//!
//! let result = simulate_analytic(
//!     &scenario.layers,
//!     &scenario.hardware,
//!     &RuntimeShape::new(8, 2048),
//! )
//! .unwrap();
//! println!("{}", render_dense_table(&result));
//! println!("{}", render_totals(&result));
//! ```

#![deny(warnings)]

pub mod report;
pub mod scenario;

pub use report::{
    render_dense_table, render_expert_parallel_table, render_totals, result_to_json,
};
pub use scenario::{load_scenario, Scenario};
