// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Layout benchmarks on synthetic reading graphs
//!
//! Graphs are layered: every paper depends on one or two papers from the
//! previous layers, so long edges and crossings both occur.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use papergraph::graph::PaperGraph;
use papergraph::layout::{fix_overlaps, LayoutConfig, Ordering};
use papergraph::types::{Paper, Position};

fn synthetic_papers(n: usize) -> Vec<Paper> {
    let now = Utc::now();
    (0..n)
        .map(|i| {
            let mut paper = Paper::new(format!("p{i}"), now);
            paper.title = format!("Paper {i}");
            if i > 0 {
                paper.dependencies.push(format!("p{}", (i * 7) % i));
            }
            if i > 3 {
                paper.dependencies.push(format!("p{}", i / 2));
            }
            paper
        })
        .collect()
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    for n in [10, 50, 200] {
        let graph = PaperGraph::project(&synthetic_papers(n));
        for ordering in [Ordering::Median, Ordering::Barycenter] {
            let config = LayoutConfig {
                ordering,
                ..LayoutConfig::default()
            };
            group.bench_with_input(
                BenchmarkId::new(format!("{ordering:?}"), n),
                &graph,
                |b, graph| b.iter(|| graph.layout(black_box(&config))),
            );
        }
    }
    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let papers = synthetic_papers(200);
    c.bench_function("project_200", |b| {
        b.iter(|| PaperGraph::project(black_box(&papers)))
    });
}

fn bench_fix_overlaps(c: &mut Criterion) {
    // Everything stacked near the origin: worst case for the pass
    #[allow(clippy::cast_precision_loss)]
    let stacked: Vec<Position> = (0..100)
        .map(|i| Position::new((i % 10) as f64 * 3.0, (i / 10) as f64 * 3.0))
        .collect();
    c.bench_function("fix_overlaps_100", |b| {
        b.iter(|| {
            let mut positions = stacked.clone();
            fix_overlaps(&mut positions, 280.0, 200.0, 20.0)
        })
    });
}

criterion_group!(benches, bench_layout, bench_projection, bench_fix_overlaps);
criterion_main!(benches);
