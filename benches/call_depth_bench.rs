//! Benchmarks for closure and call-depth computation on layered graphs

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use testlens::analysis::call_depths;
use testlens::graph::{closure, closure_all, EdgeKind, UnitGraph};
use testlens::{Granularity, ParallelConfig, Unit};

/// `tests` test classes calling into `layers` layers of `width` classes,
/// each class calling every class of the next layer.
fn layered_graph(tests: usize, layers: usize, width: usize) -> UnitGraph {
    let mut graph = UnitGraph::call_graph(Granularity::Class);
    let class = |layer: usize, i: usize| Unit::class(format!("app.l{layer}.C{i}"));

    for t in 0..tests {
        graph.add_call(
            Unit::class(format!("app.tests.Case{t}Test")),
            class(0, t % width),
            EdgeKind::Direct,
        );
    }
    for layer in 0..layers - 1 {
        for i in 0..width {
            for j in 0..width {
                graph.add_call(class(layer, i), class(layer + 1, j), EdgeKind::Virtual);
            }
        }
    }
    graph
}

fn bench_closure(c: &mut Criterion) {
    let graph = layered_graph(1, 10, 20);
    let start = Unit::class("app.tests.Case0Test");

    c.bench_function("closure_single", |b| {
        b.iter(|| closure(black_box(&graph), black_box(&start)));
    });
}

fn bench_closure_all(c: &mut Criterion) {
    let graph = layered_graph(200, 6, 15);
    let tests = graph.test_nodes();
    let pool = ParallelConfig::with_workers(4).build_pool().unwrap();

    c.bench_function("closure_all_200_tests", |b| {
        b.iter(|| closure_all(black_box(&graph), black_box(&tests), &pool));
    });
}

fn bench_call_depths(c: &mut Criterion) {
    let graph = layered_graph(200, 6, 15);

    for workers in [1, 4] {
        let pool = ParallelConfig::with_workers(workers).build_pool().unwrap();
        c.bench_function(&format!("call_depths_{workers}_workers"), |b| {
            b.iter(|| call_depths(black_box(&graph), &pool));
        });
    }
}

criterion_group!(benches, bench_closure, bench_closure_all, bench_call_depths);
criterion_main!(benches);
