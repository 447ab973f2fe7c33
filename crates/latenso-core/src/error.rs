//! Unified error types for latency estimation
//!
//! This module provides a centralized error handling system for configuration
//! validation, fused-op formulas, estimator backends, and aggregation.
//!
//! # Design
//!
//! - **`EstimateError`**: Top-level enum covering all error cases
//! - **Configuration errors**: hardware profiles, layer shapes, runtime shapes
//! - **Formula errors**: mathematically undefined shapes reaching a fused op
//! - **Backend errors**: learned-predictor failures (the only recoverable class)
//! - **Aggregation errors**: a failing layer aborting a whole simulation
//!
//! # Examples
//!
//! ```
//! use latenso_core::error::{ConfigError, EstimateError};
//!
//! fn validate_bandwidth(gbps: f64) -> Result<(), EstimateError> {
//!     if gbps <= 0.0 {
//!         return Err(EstimateError::Config(ConfigError::NonPositive {
//!             field: "memory_bandwidth_gbps",
//!             value: gbps,
//!         }));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::layer::LayerKind;

/// Top-level error type for all estimation operations
#[derive(Error, Debug)]
pub enum EstimateError {
    /// Configuration validation errors (hardware, layer, runtime shapes)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Formula domain errors (undefined shapes reaching a fused op)
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    /// Estimator backend errors (learned predictor unavailable or implausible)
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Aggregation errors (a layer failure aborting a simulation)
    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),
}

/// Validation errors for hardware, layer, and runtime configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("overlap_efficiency must lie in [0, 1], got {value}")]
    OverlapOutOfRange { value: f64 },

    #[error("{scope}.{field} must be at least 1")]
    ZeroDimension {
        scope: &'static str,
        field: &'static str,
    },

    #[error("d_model ({d_model}) is not divisible by num_heads ({num_heads}) and no head_dim was given")]
    HeadDimIndivisible { d_model: u32, num_heads: u32 },

    #[error("top_k ({top_k}) exceeds num_experts ({num_experts})")]
    TopKExceedsExperts { top_k: u32, num_experts: u32 },

    #[error("avg_experts_per_token ({value}) must lie in [0, num_experts = {num_experts}]")]
    ExpertsPerTokenOutOfRange { value: f64, num_experts: u32 },
}

/// Domain errors raised by fused-op formulas invoked with undefined shapes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("cannot select top {top_k} of {num_experts} experts")]
    TopKExceedsExperts { top_k: u32, num_experts: u32 },
}

/// Errors raised by estimator backends
///
/// This is the only error class the fallback decorator recovers from; every
/// other class aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("no trained model for layer kind `{kind}`")]
    UntrainedKind { kind: LayerKind },

    #[error("predicted {quantity} is not finite: {value}")]
    NonFinitePrediction { quantity: &'static str, value: f64 },

    #[error("predicted {quantity} is negative: {value}")]
    NegativePrediction { quantity: &'static str, value: f64 },

    #[error("predicted latency {predicted_ms} ms is outside the plausibility envelope (analytic {analytic_ms} ms, max ratio {max_ratio})")]
    OutsideEnvelope {
        predicted_ms: f64,
        analytic_ms: f64,
        max_ratio: f64,
    },
}

/// Errors raised while aggregating per-layer estimates into a simulation
#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("layer {index} (`{name}`) failed to estimate")]
    LayerFailed {
        index: usize,
        name: String,
        #[source]
        source: Box<EstimateError>,
    },
}

/// Result type alias for estimation operations
pub type EstimateResult<T> = Result<T, EstimateError>;

// Convenience constructors for common error patterns
impl EstimateError {
    /// Create a zero-dimension configuration error
    pub fn zero_dimension(scope: &'static str, field: &'static str) -> Self {
        EstimateError::Config(ConfigError::ZeroDimension { scope, field })
    }

    /// Create an untrained-kind backend error
    pub fn untrained(kind: LayerKind) -> Self {
        EstimateError::Backend(BackendError::UntrainedKind { kind })
    }

    /// Wrap a failing layer estimate with its position in the stack
    pub fn layer_failed(index: usize, name: impl Into<String>, source: EstimateError) -> Self {
        EstimateError::Aggregation(AggregationError::LayerFailed {
            index,
            name: name.into(),
            source: Box::new(source),
        })
    }

    /// True when the fallback decorator may recover from this error
    pub fn is_backend_error(&self) -> bool {
        matches!(self, EstimateError::Backend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::NonPositive {
            field: "peak_tflops",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "peak_tflops must be positive, got -1");
    }

    #[test]
    fn test_zero_dimension_message() {
        let err = ConfigError::ZeroDimension {
            scope: "ffn",
            field: "d_ff",
        };
        assert_eq!(err.to_string(), "ffn.d_ff must be at least 1");
    }

    #[test]
    fn test_formula_error_message() {
        let err = FormulaError::TopKExceedsExperts {
            top_k: 9,
            num_experts: 8,
        };
        assert_eq!(err.to_string(), "cannot select top 9 of 8 experts");
    }

    #[test]
    fn test_estimate_error_from_config() {
        let err: EstimateError = ConfigError::ZeroConcurrency.into();
        assert!(matches!(err, EstimateError::Config(_)));
        assert!(!err.is_backend_error());
    }

    #[test]
    fn test_backend_error_is_recoverable() {
        let err = EstimateError::untrained(LayerKind::Moe);
        assert!(err.is_backend_error());
        assert_eq!(
            err.to_string(),
            "Backend error: no trained model for layer kind `moe`"
        );
    }

    #[test]
    fn test_layer_failed_carries_source() {
        let inner = EstimateError::Config(ConfigError::ZeroConcurrency);
        let err = EstimateError::layer_failed(3, "moe_3", inner);
        assert_eq!(
            err.to_string(),
            "Aggregation error: layer 3 (`moe_3`) failed to estimate"
        );
    }
}
