//! Learned latency backend
//!
//! A [`LearnedBackend`] replaces the analytic compute/memory times with the
//! output of pre-trained per-kind linear regressors over the layer's feature
//! map. The analytic execution is still computed first: FLOPs, bytes, the
//! per-op breakdown, and the features themselves are ground truth, and the
//! analytic dominant latency anchors the plausibility envelope. Only the
//! time fields are overridden.
//!
//! Training and weight persistence live with external collaborators; this
//! module only defines the serde-serializable weight layout and the
//! prediction contract.

use std::collections::BTreeMap;

use latenso_core::{
    BackendError, EstimateResult, HardwareModel, LayerConfig, LayerExecution, LayerKind,
    RuntimeShape,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::backend::{estimate_layer, EstimatorBackend};

/// One linear regressor: bias plus a weighted sum over named features
///
/// Features absent from the weight map are ignored; weights whose feature is
/// absent from the input contribute zero. This keeps models trained on one
/// feature superset usable across minor key-set revisions.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearModel {
    pub weights: BTreeMap<String, f64>,
    pub bias: f64,
}

impl LinearModel {
    /// Evaluate the regressor over a feature map.
    pub fn predict(&self, features: &BTreeMap<String, f64>) -> f64 {
        let weighted: f64 = self
            .weights
            .iter()
            .map(|(key, weight)| weight * features.get(key).copied().unwrap_or(0.0))
            .sum();
        self.bias + weighted
    }
}

/// Regressor pair for one layer kind: compute and memory time in ms
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KindModel {
    pub compute_ms: LinearModel,
    pub memory_ms: LinearModel,
}

/// Trained weights for some subset of the layer kinds
///
/// Kinds without an entry are untrained; estimating one is a
/// [`BackendError::UntrainedKind`], which the fallback decorator recovers.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LearnedLatencyModel {
    pub models: BTreeMap<LayerKind, KindModel>,
}

/// Sanity band around the analytic estimate
///
/// A predicted dominant latency more than `max_ratio` times the analytic
/// one, or less than its reciprocal share, is rejected. An analytic zero
/// admits only a predicted zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibilityEnvelope {
    pub max_ratio: f64,
}

impl Default for PlausibilityEnvelope {
    fn default() -> Self {
        Self { max_ratio: 10.0 }
    }
}

impl PlausibilityEnvelope {
    pub fn check(&self, predicted_ms: f64, analytic_ms: f64) -> Result<(), BackendError> {
        let outside = if analytic_ms == 0.0 {
            predicted_ms != 0.0
        } else {
            let ratio = predicted_ms / analytic_ms;
            ratio > self.max_ratio || ratio < 1.0 / self.max_ratio
        };
        if outside {
            return Err(BackendError::OutsideEnvelope {
                predicted_ms,
                analytic_ms,
                max_ratio: self.max_ratio,
            });
        }
        Ok(())
    }
}

/// Backend predicting times from trained regressors
pub struct LearnedBackend {
    model: LearnedLatencyModel,
    envelope: PlausibilityEnvelope,
}

impl LearnedBackend {
    pub fn new(model: LearnedLatencyModel) -> Self {
        Self {
            model,
            envelope: PlausibilityEnvelope::default(),
        }
    }

    pub fn with_envelope(model: LearnedLatencyModel, envelope: PlausibilityEnvelope) -> Self {
        Self { model, envelope }
    }
}

impl EstimatorBackend for LearnedBackend {
    fn name(&self) -> &str {
        "learned"
    }

    fn estimate(
        &self,
        config: &LayerConfig,
        runtime: &RuntimeShape,
        model: &HardwareModel,
    ) -> EstimateResult<LayerExecution> {
        let mut execution = estimate_layer(config, runtime, model)?;

        let kind = config.kind();
        let kind_model = self
            .model
            .models
            .get(&kind)
            .ok_or(BackendError::UntrainedKind { kind })?;

        let compute_ms = kind_model.compute_ms.predict(&execution.features);
        let memory_ms = kind_model.memory_ms.predict(&execution.features);
        check_prediction("compute_time_ms", compute_ms)?;
        check_prediction("memory_time_ms", memory_ms)?;

        let dominant = HardwareModel::dominant_latency_ms(compute_ms, memory_ms);
        self.envelope
            .check(dominant, execution.dominant_latency_ms)?;

        execution.compute_time_ms = compute_ms;
        execution.memory_time_ms = memory_ms;
        execution.dominant_latency_ms = dominant;
        execution.estimated_execution_time_ms = dominant;
        Ok(execution)
    }
}

fn check_prediction(quantity: &'static str, value: f64) -> Result<(), BackendError> {
    if !value.is_finite() {
        return Err(BackendError::NonFinitePrediction { quantity, value });
    }
    if value < 0.0 {
        return Err(BackendError::NegativePrediction { quantity, value });
    }
    Ok(())
}
