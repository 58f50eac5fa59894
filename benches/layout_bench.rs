//! Benchmarks for graph building and layout
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use onnx_graphviz::decode::{RawGraph, RawModel, RawNode, RawValueInfo};
use onnx_graphviz::graph::build;
use onnx_graphviz::layout::{layout, LayoutConfig};

/// Residual chain: every block reads the previous block's output twice
fn residual_model(blocks: usize) -> RawModel {
    let mut nodes = Vec::with_capacity(blocks * 3);
    let mut current = "x".to_string();

    for i in 0..blocks {
        let conv = format!("conv{}", i);
        let relu = format!("relu{}", i);
        let add = format!("add{}", i);
        let weight = format!("w{}", i);

        nodes.push(RawNode::new("Conv", &[&*current, &*weight], &[&*conv]));
        nodes.push(RawNode::new("Relu", &[&*conv], &[&*relu]));
        nodes.push(RawNode::new("Add", &[&*relu, &*current], &[&*add]));
        current = add;
    }

    RawModel {
        graph: RawGraph {
            nodes,
            inputs: vec![RawValueInfo::named("x")],
            outputs: vec![RawValueInfo::named(current)],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn build_benchmark(c: &mut Criterion) {
    let model = residual_model(200);
    c.bench_function("build_600_ops", |b| b.iter(|| build(black_box(&model))));
}

fn layout_benchmark(c: &mut Criterion) {
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("layout");

    for blocks in [10usize, 50, 100] {
        let graph = build(&residual_model(blocks));
        group.bench_with_input(BenchmarkId::from_parameter(blocks * 3), &graph, |b, graph| {
            b.iter(|| layout(black_box(graph), &config))
        });
    }

    group.finish();
}

criterion_group!(benches, build_benchmark, layout_benchmark);
criterion_main!(benches);
