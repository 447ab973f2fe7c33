//! Static layer configuration
//!
//! A [`LayerConfig`] is a tagged variant over the four layer kinds; each
//! variant carries exactly one type-specific shape payload, so reading the
//! wrong payload for a kind is impossible by construction. Runtime knobs
//! (batch, sequence length) live in [`crate::shape::RuntimeShape`], never
//! here.
//!
//! The serde field aliases mirror the checkpoint-config vocabulary the
//! scenario files use (`num_attention_heads`, `intermediate_size`,
//! `n_routed_experts`, ...), so real model configs deserialize directly.

use std::fmt;

use crate::error::ConfigError;
use crate::metrics::DEFAULT_DTYPE_BITS;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The four layer kinds the estimator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LayerKind {
    Attention,
    Ffn,
    Moe,
    Communication,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayerKind::Attention => "attention",
            LayerKind::Ffn => "ffn",
            LayerKind::Moe => "moe",
            LayerKind::Communication => "communication",
        })
    }
}

/// FFN activation function, priced as a fixed per-element FLOP cost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Activation {
    Relu,
    Gelu,
    Silu,
}

impl Activation {
    /// Coarse per-element cost: one comparison for ReLU, a tanh-polynomial
    /// budget for GELU, sigmoid-plus-multiply for SiLU.
    pub fn flops_per_element(&self) -> f64 {
        match self {
            Activation::Relu => 1.0,
            Activation::Gelu => 8.0,
            Activation::Silu => 5.0,
        }
    }
}

/// Collective pattern of a communication layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CollectivePattern {
    AllToAll,
    AllReduce,
}

impl fmt::Display for CollectivePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CollectivePattern::AllToAll => "all_to_all",
            CollectivePattern::AllReduce => "all_reduce",
        })
    }
}

/// Multi-head attention shape
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AttentionShape {
    pub d_model: u32,
    #[cfg_attr(feature = "serde", serde(alias = "num_attention_heads"))]
    pub num_heads: u32,
    /// Explicit head width; when absent, d_model / num_heads
    pub head_dim: Option<u32>,
    pub dtype_bits: u32,
}

impl Default for AttentionShape {
    fn default() -> Self {
        Self {
            d_model: 768,
            num_heads: 8,
            head_dim: None,
            dtype_bits: DEFAULT_DTYPE_BITS,
        }
    }
}

impl AttentionShape {
    /// The per-head width: explicit when given, otherwise d_model split
    /// evenly across heads.
    pub fn resolved_head_dim(&self) -> u32 {
        match self.head_dim {
            Some(dim) => dim,
            None => self.d_model / self.num_heads.max(1),
        }
    }

    /// Width of each of the Q/K/V projections: num_heads × head_dim.
    pub fn qkv_dim(&self) -> u32 {
        self.num_heads * self.resolved_head_dim()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_dim("attention", "d_model", self.d_model)?;
        require_dim("attention", "num_heads", self.num_heads)?;
        require_dim("attention", "dtype_bits", self.dtype_bits)?;
        if self.head_dim.is_none() && self.d_model % self.num_heads != 0 {
            return Err(ConfigError::HeadDimIndivisible {
                d_model: self.d_model,
                num_heads: self.num_heads,
            });
        }
        Ok(())
    }
}

/// Dense feed-forward shape
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FfnShape {
    pub d_model: u32,
    #[cfg_attr(feature = "serde", serde(alias = "intermediate_size"))]
    pub d_ff: u32,
    pub activation: Activation,
    /// Adds a parallel gate projection (SwiGLU-style FFN)
    pub gated: bool,
    pub dtype_bits: u32,
}

impl Default for FfnShape {
    fn default() -> Self {
        Self {
            d_model: 768,
            d_ff: 3072,
            activation: Activation::Silu,
            gated: false,
            dtype_bits: DEFAULT_DTYPE_BITS,
        }
    }
}

impl FfnShape {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_dim("ffn", "d_model", self.d_model)?;
        require_dim("ffn", "d_ff", self.d_ff)?;
        require_dim("ffn", "dtype_bits", self.dtype_bits)?;
        Ok(())
    }
}

/// Mixture-of-experts shape
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MoeShape {
    #[cfg_attr(feature = "serde", serde(alias = "model_dim"))]
    pub d_model: u32,
    #[cfg_attr(
        feature = "serde",
        serde(alias = "moe_intermediate_size", alias = "d_ff")
    )]
    pub expert_hidden: u32,
    #[cfg_attr(feature = "serde", serde(alias = "n_routed_experts"))]
    pub num_experts: u32,
    #[cfg_attr(feature = "serde", serde(alias = "topk_group"))]
    pub top_k: u32,
    /// Mean routed experts per token; top_k when absent. Zero is a valid
    /// value meaning no token activates any expert.
    #[cfg_attr(feature = "serde", serde(alias = "num_experts_per_tok"))]
    pub avg_experts_per_token: Option<f64>,
    /// Expert-parallel group count the dispatch payload is divided across
    #[cfg_attr(feature = "serde", serde(alias = "n_group"))]
    pub num_groups: u32,
    pub dtype_bits: u32,
}

impl Default for MoeShape {
    fn default() -> Self {
        Self {
            d_model: 768,
            expert_hidden: 3072,
            num_experts: 1,
            top_k: 1,
            avg_experts_per_token: None,
            num_groups: 1,
            dtype_bits: DEFAULT_DTYPE_BITS,
        }
    }
}

impl MoeShape {
    /// Mean routed experts per token, defaulting to top_k.
    pub fn resolved_avg_experts_per_token(&self) -> f64 {
        self.avg_experts_per_token
            .unwrap_or(self.top_k as f64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_dim("moe", "d_model", self.d_model)?;
        require_dim("moe", "expert_hidden", self.expert_hidden)?;
        require_dim("moe", "num_experts", self.num_experts)?;
        require_dim("moe", "top_k", self.top_k)?;
        require_dim("moe", "num_groups", self.num_groups)?;
        require_dim("moe", "dtype_bits", self.dtype_bits)?;
        if self.top_k > self.num_experts {
            return Err(ConfigError::TopKExceedsExperts {
                top_k: self.top_k,
                num_experts: self.num_experts,
            });
        }
        if let Some(avg) = self.avg_experts_per_token {
            if !avg.is_finite() {
                return Err(ConfigError::NotFinite {
                    field: "avg_experts_per_token",
                    value: avg,
                });
            }
            if avg < 0.0 || avg > self.num_experts as f64 {
                return Err(ConfigError::ExpertsPerTokenOutOfRange {
                    value: avg,
                    num_experts: self.num_experts,
                });
            }
        }
        Ok(())
    }
}

/// Communication layer shape
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CommShape {
    pub pattern: CollectivePattern,
    /// Per-device payload in megabytes
    pub payload_mb: f64,
}

impl Default for CommShape {
    fn default() -> Self {
        Self {
            pattern: CollectivePattern::AllToAll,
            payload_mb: 1.0,
        }
    }
}

impl CommShape {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.payload_mb.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "payload_mb",
                value: self.payload_mb,
            });
        }
        if self.payload_mb < 0.0 {
            return Err(ConfigError::Negative {
                field: "payload_mb",
                value: self.payload_mb,
            });
        }
        Ok(())
    }
}

/// One layer of a simulated stack: identity plus a kind-specific shape
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum LayerConfig {
    Attention {
        name: String,
        layer_id: u32,
        shape: AttentionShape,
    },
    Ffn {
        name: String,
        layer_id: u32,
        shape: FfnShape,
    },
    Moe {
        name: String,
        layer_id: u32,
        shape: MoeShape,
    },
    Communication {
        name: String,
        layer_id: u32,
        shape: CommShape,
    },
}

impl LayerConfig {
    pub fn attention(name: impl Into<String>, layer_id: u32, shape: AttentionShape) -> Self {
        LayerConfig::Attention {
            name: name.into(),
            layer_id,
            shape,
        }
    }

    pub fn ffn(name: impl Into<String>, layer_id: u32, shape: FfnShape) -> Self {
        LayerConfig::Ffn {
            name: name.into(),
            layer_id,
            shape,
        }
    }

    pub fn moe(name: impl Into<String>, layer_id: u32, shape: MoeShape) -> Self {
        LayerConfig::Moe {
            name: name.into(),
            layer_id,
            shape,
        }
    }

    pub fn communication(name: impl Into<String>, layer_id: u32, shape: CommShape) -> Self {
        LayerConfig::Communication {
            name: name.into(),
            layer_id,
            shape,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LayerConfig::Attention { name, .. }
            | LayerConfig::Ffn { name, .. }
            | LayerConfig::Moe { name, .. }
            | LayerConfig::Communication { name, .. } => name,
        }
    }

    pub fn layer_id(&self) -> u32 {
        match self {
            LayerConfig::Attention { layer_id, .. }
            | LayerConfig::Ffn { layer_id, .. }
            | LayerConfig::Moe { layer_id, .. }
            | LayerConfig::Communication { layer_id, .. } => *layer_id,
        }
    }

    pub fn kind(&self) -> LayerKind {
        match self {
            LayerConfig::Attention { .. } => LayerKind::Attention,
            LayerConfig::Ffn { .. } => LayerKind::Ffn,
            LayerConfig::Moe { .. } => LayerKind::Moe,
            LayerConfig::Communication { .. } => LayerKind::Communication,
        }
    }

    /// Validate the kind-specific shape. Runs both at scenario load and at
    /// the start of every estimate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            LayerConfig::Attention { shape, .. } => shape.validate(),
            LayerConfig::Ffn { shape, .. } => shape.validate(),
            LayerConfig::Moe { shape, .. } => shape.validate(),
            LayerConfig::Communication { shape, .. } => shape.validate(),
        }
    }
}

fn require_dim(scope: &'static str, field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroDimension { scope, field });
    }
    Ok(())
}
