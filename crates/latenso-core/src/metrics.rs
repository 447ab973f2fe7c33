//! Metric helpers for FLOP counting and tensor sizing
//!
//! These are the shared primitives every fused-op formula is built from. They
//! carry no hardware knowledge; converting work into time is the job of
//! [`crate::model::HardwareModel`].

/// Default element width in bits (half precision).
pub const DEFAULT_DTYPE_BITS: u32 = 16;

/// FLOPs for a dense matmul of an (m × k) by (k × n) pair.
///
/// Each output element requires k multiply-adds, counted as 2 FLOPs.
pub fn matmul_flops(m: u64, n: u64, k: u64) -> f64 {
    2.0 * m as f64 * n as f64 * k as f64
}

/// Number of elements in a tensor shape.
///
/// Negative dimensions clamp to zero, so a degenerate shape contributes
/// nothing rather than producing a negative count.
pub fn tensor_elements(shape: &[i64]) -> f64 {
    shape.iter().map(|&dim| dim.max(0) as f64).product()
}

/// Bytes occupied by a tensor of the given shape and element width.
pub fn tensor_bytes(shape: &[i64], dtype_bits: u32) -> f64 {
    tensor_elements(shape) * dtype_bits as f64 / 8.0
}

/// Convert a payload size in megabytes (10^6 bytes) to bytes.
pub fn mb_to_bytes(mb: f64) -> f64 {
    mb * 1e6
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_flops() {
        // 2 * 3 output elements, each requires 4 multiply-adds
        // Total: 2 * 3 * 4 * 2 = 48 FLOPs
        assert_eq!(matmul_flops(2, 3, 4), 48.0);
    }

    #[test]
    fn test_matmul_flops_zero_dim() {
        assert_eq!(matmul_flops(0, 3, 4), 0.0);
        assert_eq!(matmul_flops(2, 0, 4), 0.0);
        assert_eq!(matmul_flops(2, 3, 0), 0.0);
    }

    #[test]
    fn test_tensor_elements() {
        assert_eq!(tensor_elements(&[2, 3, 4]), 24.0);
        assert_eq!(tensor_elements(&[]), 1.0);
    }

    #[test]
    fn test_tensor_elements_clamps_negative() {
        assert_eq!(tensor_elements(&[2, -3, 4]), 0.0);
    }

    #[test]
    fn test_tensor_bytes() {
        // 2 * 2 elements at 32 bits = 4 elements * 4 bytes = 16 bytes
        assert_eq!(tensor_bytes(&[2, 2], 32), 16.0);
        // Default half precision: 2 * 2 elements * 2 bytes = 8 bytes
        assert_eq!(tensor_bytes(&[2, 2], DEFAULT_DTYPE_BITS), 8.0);
    }

    #[test]
    fn test_mb_to_bytes() {
        assert_eq!(mb_to_bytes(1.0), 1e6);
        assert_eq!(mb_to_bytes(0.0), 0.0);
        assert_eq!(mb_to_bytes(2.5), 2.5e6);
    }
}
