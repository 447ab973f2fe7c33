//! Benchmarks for per-layer estimation and full-stack simulation.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use latenso_core::{
    AttentionShape, CollectivePattern, CommShape, FfnShape, HardwareModel, HardwareSpec,
    LayerConfig, MoeShape, RuntimeShape,
};
use latenso_sim::{simulate_analytic, AnalyticBackend, EstimatorBackend};

/// A 24-block decoder stack with MoE FFNs and expert dispatch.
fn decoder_stack(blocks: u32) -> Vec<LayerConfig> {
    let mut layers = Vec::with_capacity(blocks as usize * 3);
    for block in 0..blocks {
        layers.push(LayerConfig::attention(
            format!("attn_{block}"),
            block,
            AttentionShape {
                d_model: 4096,
                num_heads: 32,
                ..Default::default()
            },
        ));
        layers.push(LayerConfig::moe(
            format!("moe_{block}"),
            block,
            MoeShape {
                d_model: 4096,
                expert_hidden: 2048,
                num_experts: 64,
                top_k: 4,
                num_groups: 8,
                ..Default::default()
            },
        ));
        layers.push(LayerConfig::communication(
            format!("dispatch_{block}"),
            block,
            CommShape {
                pattern: CollectivePattern::AllToAll,
                payload_mb: 32.0,
            },
        ));
    }
    layers
}

fn bench_single_layer(c: &mut Criterion) {
    let model = HardwareModel::new(HardwareSpec::h100_sxm()).unwrap();
    let runtime = RuntimeShape::new(8, 4096);
    let backend = AnalyticBackend;

    let layers = [
        LayerConfig::attention(
            "attn",
            0,
            AttentionShape {
                d_model: 4096,
                num_heads: 32,
                ..Default::default()
            },
        ),
        LayerConfig::ffn(
            "ffn",
            0,
            FfnShape {
                d_model: 4096,
                d_ff: 16384,
                gated: true,
                ..Default::default()
            },
        ),
        LayerConfig::moe(
            "moe",
            0,
            MoeShape {
                d_model: 4096,
                expert_hidden: 2048,
                num_experts: 64,
                top_k: 4,
                ..Default::default()
            },
        ),
    ];

    let mut group = c.benchmark_group("single_layer");
    for layer in &layers {
        group.bench_with_input(
            BenchmarkId::new("estimate", layer.kind()),
            layer,
            |b, layer| {
                b.iter(|| {
                    backend
                        .estimate(black_box(layer), black_box(&runtime), &model)
                        .unwrap()
                })
            },
        );
    }
    group.finish();
}

fn bench_stack_simulation(c: &mut Criterion) {
    let hardware = HardwareSpec::h100_sxm();
    let layers = decoder_stack(24);
    let runtime = RuntimeShape::new(8, 4096);

    let mut group = c.benchmark_group("stack_simulation");
    group.throughput(Throughput::Elements(layers.len() as u64));
    group.bench_function("decoder_24_blocks", |b| {
        b.iter(|| simulate_analytic(black_box(&layers), &hardware, &runtime).unwrap())
    });
    group.finish();
}

fn bench_batch_sweep(c: &mut Criterion) {
    let hardware = HardwareSpec::h100_sxm();
    let layers = decoder_stack(24);

    let mut group = c.benchmark_group("batch_sweep");
    for batch in [1u32, 8, 32, 128] {
        let runtime = RuntimeShape::new(batch, 4096);
        group.bench_with_input(BenchmarkId::new("decoder", batch), &runtime, |b, runtime| {
            b.iter(|| simulate_analytic(black_box(&layers), &hardware, runtime).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_single_layer,
    bench_stack_simulation,
    bench_batch_sweep
);
criterion_main!(benches);
