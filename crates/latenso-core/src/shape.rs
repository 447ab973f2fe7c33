//! Runtime shape: the per-invocation knobs of a simulation
//!
//! Batch size and sequence length are runtime properties, never baked into
//! static layer configuration. The optional fields carry deployment overrides
//! that only some layer kinds consume.

use crate::error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Runtime overrides supplied per simulation run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RuntimeShape {
    /// Number of sequences per forward pass
    pub batch_size: u32,
    /// Tokens per sequence
    pub seq_len: u32,
    /// Micro-batch split for pipelined serving; validated but not consumed
    /// by the analytic formulas
    pub micro_batch: Option<u32>,
    /// Overrides the MoE active token-expert pair count: when set, each
    /// expert processes this many tokens, so pairs = tokens_per_expert ×
    /// num_experts instead of tokens × avg_experts_per_token
    pub tokens_per_expert: Option<f64>,
}

impl RuntimeShape {
    /// Shape with only the mandatory knobs set.
    pub fn new(batch_size: u32, seq_len: u32) -> Self {
        Self {
            batch_size,
            seq_len,
            micro_batch: None,
            tokens_per_expert: None,
        }
    }

    /// Total tokens in flight: batch × sequence length.
    pub fn tokens(&self) -> u64 {
        self.batch_size as u64 * self.seq_len as u64
    }

    /// Reject impossible runtime shapes before any estimate runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroDimension {
                scope: "runtime",
                field: "batch_size",
            });
        }
        if self.seq_len == 0 {
            return Err(ConfigError::ZeroDimension {
                scope: "runtime",
                field: "seq_len",
            });
        }
        if self.micro_batch == Some(0) {
            return Err(ConfigError::ZeroDimension {
                scope: "runtime",
                field: "micro_batch",
            });
        }
        if let Some(tpe) = self.tokens_per_expert {
            if !tpe.is_finite() {
                return Err(ConfigError::NotFinite {
                    field: "tokens_per_expert",
                    value: tpe,
                });
            }
            if tpe < 0.0 {
                return Err(ConfigError::Negative {
                    field: "tokens_per_expert",
                    value: tpe,
                });
            }
        }
        Ok(())
    }
}
