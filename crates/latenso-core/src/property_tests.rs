//! Property-based tests for the fused-op catalog
//!
//! This module uses proptest to verify that the cost formulas stay
//! deterministic, non-negative, and monotone in batch across a wide range of
//! randomly generated shapes.

#[cfg(test)]
mod tests {
    use crate::layer::Activation;
    use crate::ops::*;
    use proptest::prelude::*;

    fn dims() -> impl Strategy<Value = (u32, u32, u32, u32)> {
        (1u32..=16, 1u32..=512, 1u32..=1024, 1u32..=2048)
    }

    #[test]
    fn test_proptest_smoke() {
        let cost = ffn_up_proj(1, 1, 1, 1, 16);
        assert_eq!(cost.flops, 2.0);
    }

    proptest! {
        #[test]
        fn prop_costs_are_non_negative((batch, seq, d_model, d_ff) in dims()) {
            let ops = [
                attention_qkv_proj(batch, seq, d_model, d_model, 16),
                attention_scores(batch, seq, 8, d_model / 8 + 1, 16),
                attention_weighted_sum(batch, seq, 8, d_model / 8 + 1, 16),
                attention_output_proj(batch, seq, d_model, d_model, 16),
                ffn_up_proj(batch, seq, d_model, d_ff, 16),
                ffn_activation(batch, seq, d_ff, Activation::Silu, 16),
                ffn_down_proj(batch, seq, d_model, d_ff, 16),
            ];
            for cost in ops {
                prop_assert!(cost.flops >= 0.0);
                prop_assert!(cost.bytes_read >= 0.0);
                prop_assert!(cost.bytes_written >= 0.0);
                prop_assert!(cost.arithmetic_intensity() >= 0.0);
            }
        }

        #[test]
        fn prop_costs_are_deterministic((batch, seq, d_model, d_ff) in dims()) {
            let first = ffn_up_proj(batch, seq, d_model, d_ff, 16);
            let second = ffn_up_proj(batch, seq, d_model, d_ff, 16);
            prop_assert_eq!(first, second);

            let first = attention_scores(batch, seq, 4, 64, 16);
            let second = attention_scores(batch, seq, 4, 64, 16);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_doubling_batch_never_decreases_cost((batch, seq, d_model, d_ff) in dims()) {
            let base = ffn_up_proj(batch, seq, d_model, d_ff, 16);
            let doubled = ffn_up_proj(batch * 2, seq, d_model, d_ff, 16);
            prop_assert!(doubled.flops >= base.flops);
            prop_assert!(doubled.bytes_read >= base.bytes_read);
            prop_assert!(doubled.bytes_written >= base.bytes_written);

            let base = attention_qkv_proj(batch, seq, d_model, d_model, 16);
            let doubled = attention_qkv_proj(batch * 2, seq, d_model, d_model, 16);
            prop_assert!(doubled.flops >= base.flops);
            prop_assert!(doubled.bytes_read >= base.bytes_read);
        }

        #[test]
        fn prop_gemm_flops_scale_linearly_in_batch((batch, seq, d_model, d_ff) in dims()) {
            let one = ffn_down_proj(1, seq, d_model, d_ff, 16);
            let many = ffn_down_proj(batch, seq, d_model, d_ff, 16);
            prop_assert_eq!(many.flops, one.flops * batch as f64);
        }

        #[test]
        fn prop_topk_select_domain(tokens in 0u64..=100_000, num_experts in 1u32..=512) {
            // Any k up to the expert count is defined, anything above is not.
            prop_assert!(moe_topk_select(tokens, num_experts, num_experts, 16).is_ok());
            prop_assert!(moe_topk_select(tokens, num_experts, num_experts + 1, 16).is_err());
        }

        #[test]
        fn prop_expert_forward_monotone_in_pairs(pairs in 0.0f64..1e6, d_model in 1u32..=2048, hidden in 1u32..=4096) {
            let base = moe_expert_forward(pairs, d_model, hidden, 16);
            let more = moe_expert_forward(pairs * 2.0, d_model, hidden, 16);
            prop_assert!(more.flops >= base.flops);
            prop_assert!(more.bytes_read >= base.bytes_read);
            prop_assert!(more.bytes_written >= base.bytes_written);
        }

        #[test]
        fn prop_collectives_have_zero_flops(payload in 0.0f64..1e12) {
            prop_assert_eq!(all_to_all(payload).flops, 0.0);
            prop_assert_eq!(all_reduce(payload).flops, 0.0);
            prop_assert_eq!(all_to_all(payload).bytes_read, payload);
            prop_assert_eq!(all_reduce(payload).bytes_written, payload);
        }
    }
}
