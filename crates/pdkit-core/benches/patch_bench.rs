//! Criterion benchmarks for the patch codec and graph passes.
//!
//! Three axes over synthetic patches of growing size:
//!
//! - **Codec** — `parse` and `serialize` throughput
//! - **Optimize** — dedup, collapse and unused removal in one run
//! - **Layout** — `auto_layout` on chains with feedback cords
//!
//! Run with: `cargo bench -p pdkit-core`
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pdkit_core::{
    AutoLayoutOptions, Graph, OptimizeOptions, parse, serialize, to_tree,
};

const SIZES: &[usize] = &[100, 1_000, 10_000];

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Chain of `n` objects with a duplicate cord, a pass-through and a
/// feedback cord every ten nodes.
fn make_chain(n: usize) -> Graph {
    let mut graph = Graph::new();
    let mut prev = graph.add("osc~ 440");
    for i in 1..n {
        let next = match i % 10 {
            3 => graph.add("change"),
            7 => graph.add_msg("set $1; bang"),
            _ => graph.add("f"),
        };
        graph.link(prev, next, 0).unwrap();
        if i % 10 == 5 {
            graph.link(prev, next, 0).unwrap();
            graph.link(next, prev, 1).unwrap();
        }
        prev = next;
    }
    graph
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for &n in SIZES {
        let patch = to_tree(&make_chain(n));
        let text = serialize(&patch);

        group.bench_with_input(BenchmarkId::new("parse", n), &text, |b, text| {
            b.iter(|| black_box(parse(black_box(text)).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("serialize", n), &patch, |b, patch| {
            b.iter(|| black_box(serialize(black_box(patch))));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Optimize
// ---------------------------------------------------------------------------

fn bench_optimize(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize");
    let options = OptimizeOptions::collapsing(["change"]);

    for &n in SIZES {
        let graph = make_chain(n);
        group.bench_with_input(BenchmarkId::new("chain", n), &graph, |b, graph| {
            b.iter(|| {
                let mut graph = graph.clone();
                black_box(graph.optimize(&options))
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let options = AutoLayoutOptions::default();

    for &n in SIZES {
        let mut graph = make_chain(n);
        group.bench_function(BenchmarkId::new("auto", n), |b| {
            b.iter(|| black_box(graph.auto_layout(&options)));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_codec, bench_optimize, bench_layout);
criterion_main!(benches);
