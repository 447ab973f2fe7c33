//! Fused-operation cost library
//!
//! Every function here is a pure mapping from shape parameters to an
//! [`OpCost`]: FLOPs, bytes read (weights plus incoming activations), and
//! bytes written (outgoing activations). The formulas know nothing about
//! hardware and are bit-for-bit reproducible, so the same shapes always
//! produce the same costs across runs and processes.
//!
//! Zero-sized dimensions yield zero cost rather than an error; the only
//! domain restriction in the catalog is [`moe_topk_select`], which cannot
//! select more experts than exist.

use crate::error::FormulaError;
use crate::layer::Activation;
use crate::metrics::{matmul_flops, tensor_bytes};

/// Cost of one fused operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpCost {
    /// Catalog name of the op, stable across runs
    pub name: &'static str,
    pub flops: f64,
    pub bytes_read: f64,
    pub bytes_written: f64,
}

impl OpCost {
    /// Total bytes moved through memory, both directions.
    pub fn total_bytes(&self) -> f64 {
        self.bytes_read + self.bytes_written
    }

    /// FLOPs per byte moved; zero-traffic ops report zero intensity.
    pub fn arithmetic_intensity(&self) -> f64 {
        let bytes = self.total_bytes();
        if bytes == 0.0 {
            return 0.0;
        }
        self.flops / bytes
    }
}

// ---------------------------------------------------------------------------
// Attention
// ---------------------------------------------------------------------------

/// Fused Q/K/V projections: three GEMMs from d_model to qkv_dim.
pub fn attention_qkv_proj(
    batch: u32,
    seq: u32,
    d_model: u32,
    qkv_dim: u32,
    dtype_bits: u32,
) -> OpCost {
    let tokens = batch as u64 * seq as u64;
    let flops = 3.0 * matmul_flops(tokens, qkv_dim as u64, d_model as u64);
    let input = tensor_bytes(&[batch as i64, seq as i64, d_model as i64], dtype_bits);
    let weights = 3.0 * tensor_bytes(&[d_model as i64, qkv_dim as i64], dtype_bits);
    let outputs = 3.0 * tensor_bytes(&[batch as i64, seq as i64, qkv_dim as i64], dtype_bits);
    OpCost {
        name: "attention_qkv_proj",
        flops,
        bytes_read: input + weights,
        bytes_written: outputs,
    }
}

/// QK^T score matrix per head plus the softmax pass over it.
pub fn attention_scores(
    batch: u32,
    seq: u32,
    num_heads: u32,
    head_dim: u32,
    dtype_bits: u32,
) -> OpCost {
    let heads = batch as f64 * num_heads as f64;
    let gemm = matmul_flops(seq as u64, seq as u64, head_dim as u64) * heads;
    let softmax = heads * seq as f64 * seq as f64;
    let qk = 2.0
        * tensor_bytes(
            &[batch as i64, num_heads as i64, seq as i64, head_dim as i64],
            dtype_bits,
        );
    let attn = tensor_bytes(
        &[batch as i64, num_heads as i64, seq as i64, seq as i64],
        dtype_bits,
    );
    OpCost {
        name: "attention_scores",
        flops: gemm + softmax,
        bytes_read: qk,
        bytes_written: attn,
    }
}

/// Attention-weighted value sum per head.
pub fn attention_weighted_sum(
    batch: u32,
    seq: u32,
    num_heads: u32,
    head_dim: u32,
    dtype_bits: u32,
) -> OpCost {
    let heads = batch as f64 * num_heads as f64;
    let flops = matmul_flops(seq as u64, head_dim as u64, seq as u64) * heads;
    let attn = tensor_bytes(
        &[batch as i64, num_heads as i64, seq as i64, seq as i64],
        dtype_bits,
    );
    let values = tensor_bytes(
        &[batch as i64, num_heads as i64, seq as i64, head_dim as i64],
        dtype_bits,
    );
    let output = tensor_bytes(
        &[batch as i64, seq as i64, (num_heads * head_dim) as i64],
        dtype_bits,
    );
    OpCost {
        name: "attention_weighted_sum",
        flops,
        bytes_read: attn + values,
        bytes_written: output,
    }
}

/// Output projection back to d_model.
pub fn attention_output_proj(
    batch: u32,
    seq: u32,
    d_model: u32,
    qkv_dim: u32,
    dtype_bits: u32,
) -> OpCost {
    let tokens = batch as u64 * seq as u64;
    let flops = matmul_flops(tokens, d_model as u64, qkv_dim as u64);
    let input = tensor_bytes(&[batch as i64, seq as i64, qkv_dim as i64], dtype_bits);
    let weight = tensor_bytes(&[qkv_dim as i64, d_model as i64], dtype_bits);
    let output = tensor_bytes(&[batch as i64, seq as i64, d_model as i64], dtype_bits);
    OpCost {
        name: "attention_output_proj",
        flops,
        bytes_read: input + weight,
        bytes_written: output,
    }
}

// ---------------------------------------------------------------------------
// Feed-forward
// ---------------------------------------------------------------------------

/// Up projection: d_model to d_ff.
pub fn ffn_up_proj(batch: u32, seq: u32, d_model: u32, d_ff: u32, dtype_bits: u32) -> OpCost {
    projection("ffn_up_proj", batch, seq, d_model, d_ff, dtype_bits)
}

/// Gate projection of a gated FFN; same shape as the up projection.
pub fn ffn_gate_proj(batch: u32, seq: u32, d_model: u32, d_ff: u32, dtype_bits: u32) -> OpCost {
    projection("ffn_gate_proj", batch, seq, d_model, d_ff, dtype_bits)
}

/// Elementwise activation over the hidden tensor.
pub fn ffn_activation(
    batch: u32,
    seq: u32,
    d_ff: u32,
    activation: Activation,
    dtype_bits: u32,
) -> OpCost {
    let elements = batch as f64 * seq as f64 * d_ff as f64;
    let hidden = tensor_bytes(&[batch as i64, seq as i64, d_ff as i64], dtype_bits);
    OpCost {
        name: "ffn_activation",
        flops: elements * activation.flops_per_element(),
        bytes_read: hidden,
        bytes_written: hidden,
    }
}

/// Down projection: d_ff back to d_model.
pub fn ffn_down_proj(batch: u32, seq: u32, d_model: u32, d_ff: u32, dtype_bits: u32) -> OpCost {
    let tokens = batch as u64 * seq as u64;
    let flops = matmul_flops(tokens, d_model as u64, d_ff as u64);
    let hidden = tensor_bytes(&[batch as i64, seq as i64, d_ff as i64], dtype_bits);
    let weight = tensor_bytes(&[d_ff as i64, d_model as i64], dtype_bits);
    let output = tensor_bytes(&[batch as i64, seq as i64, d_model as i64], dtype_bits);
    OpCost {
        name: "ffn_down_proj",
        flops,
        bytes_read: hidden + weight,
        bytes_written: output,
    }
}

fn projection(
    name: &'static str,
    batch: u32,
    seq: u32,
    d_model: u32,
    d_ff: u32,
    dtype_bits: u32,
) -> OpCost {
    let tokens = batch as u64 * seq as u64;
    let flops = matmul_flops(tokens, d_ff as u64, d_model as u64);
    let input = tensor_bytes(&[batch as i64, seq as i64, d_model as i64], dtype_bits);
    let weight = tensor_bytes(&[d_model as i64, d_ff as i64], dtype_bits);
    let output = tensor_bytes(&[batch as i64, seq as i64, d_ff as i64], dtype_bits);
    OpCost {
        name,
        flops,
        bytes_read: input + weight,
        bytes_written: output,
    }
}

// ---------------------------------------------------------------------------
// Mixture of experts
// ---------------------------------------------------------------------------

/// Router gating: score every token against every expert. The activation
/// read is carried by the expert forward op; gating writes the score matrix.
pub fn moe_router_gating(tokens: u64, num_experts: u32, dtype_bits: u32) -> OpCost {
    OpCost {
        name: "moe_router_gating",
        flops: tokens as f64 * num_experts as f64,
        bytes_read: 0.0,
        bytes_written: tensor_bytes(&[tokens as i64, num_experts as i64], dtype_bits),
    }
}

/// Top-k selection over the gating scores. Selected expert ids are written
/// as 32-bit indices. Selecting more experts than exist is undefined.
pub fn moe_topk_select(
    tokens: u64,
    num_experts: u32,
    top_k: u32,
    dtype_bits: u32,
) -> Result<OpCost, FormulaError> {
    if top_k > num_experts {
        return Err(FormulaError::TopKExceedsExperts { top_k, num_experts });
    }
    Ok(OpCost {
        name: "moe_topk_select",
        flops: tokens as f64 * top_k as f64,
        bytes_read: tensor_bytes(&[tokens as i64, num_experts as i64], dtype_bits),
        bytes_written: tensor_bytes(&[tokens as i64, top_k as i64], 32),
    })
}

/// Expert FFN over the active token-expert pairs: two GEMMs plus one
/// activation pass over the hidden elements. `active_pairs` may be
/// fractional (it is an expectation, not a tensor dimension); negative
/// values clamp to zero like any degenerate dimension.
pub fn moe_expert_forward(
    active_pairs: f64,
    d_model: u32,
    expert_hidden: u32,
    dtype_bits: u32,
) -> OpCost {
    let pairs = active_pairs.max(0.0);
    let dm = d_model as f64;
    let eh = expert_hidden as f64;
    let bytes_per_elem = dtype_bits as f64 / 8.0;

    let gemms = 2.0 * pairs * eh * dm + 2.0 * pairs * dm * eh;
    let activation = pairs * eh;

    let activations_in = pairs * dm * bytes_per_elem;
    let hidden = pairs * eh * bytes_per_elem;
    let weights = 2.0 * dm * eh * bytes_per_elem;
    let output = pairs * dm * bytes_per_elem;

    OpCost {
        name: "moe_expert_forward",
        flops: gemms + activation,
        bytes_read: activations_in + hidden + weights,
        bytes_written: output,
    }
}

// ---------------------------------------------------------------------------
// Communication
// ---------------------------------------------------------------------------

/// All-to-all dispatch: zero FLOPs, the payload crosses the device boundary
/// and touches HBM on both sides.
pub fn all_to_all(payload_bytes: f64) -> OpCost {
    collective("all_to_all", payload_bytes)
}

/// All-reduce: zero FLOPs, payload bytes on both the read and write side.
pub fn all_reduce(payload_bytes: f64) -> OpCost {
    collective("all_reduce", payload_bytes)
}

fn collective(name: &'static str, payload_bytes: f64) -> OpCost {
    let payload = payload_bytes.max(0.0);
    OpCost {
        name,
        flops: 0.0,
        bytes_read: payload,
        bytes_written: payload,
    }
}
