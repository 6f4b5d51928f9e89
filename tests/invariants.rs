// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Invariant tests for the paper graph
//!
//! These tests verify:
//! 1. Projection - edges exist exactly for valid dependencies
//! 2. Layout - deterministic, rank-monotone on acyclic input, separated
//! 3. Overlap correction - no padded boxes intersect afterwards
//! 4. Edit round-trip - saving a title change touches nothing else

use chrono::{TimeZone, Utc};
use papergraph::graph::PaperGraph;
use papergraph::layout::{self, fix_overlaps, overlaps, Direction, LayoutConfig, Ordering};
use papergraph::session::Session;
use papergraph::store::MemoryStore;
use papergraph::types::{Document, Paper, Position, Priority, ReadingStatus};
use proptest::prelude::*;
use std::collections::HashSet;

// =============================================================================
// Test Helpers
// =============================================================================

fn make_paper(id: &str, deps: &[&str]) -> Paper {
    let then = Utc.with_ymd_and_hms(2023, 3, 14, 12, 0, 0).unwrap();
    let mut paper = Paper::new(id, then);
    paper.title = format!("Paper {id}");
    paper.dependencies = deps.iter().map(|d| (*d).to_string()).collect();
    paper
}

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("p{i}")).collect()
}

fn any_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::TopToBottom),
        Just(Direction::BottomToTop),
        Just(Direction::LeftToRight),
        Just(Direction::RightToLeft),
    ]
}

fn any_ordering() -> impl Strategy<Value = Ordering> {
    prop_oneof![Just(Ordering::Median), Just(Ordering::Barycenter)]
}

/// Node count and forward edges (i < j), so the graph is acyclic
fn dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..14).prop_flat_map(|n| {
        let edges = prop::collection::vec((0..n, 0..n), 0..n * 2).prop_map(|pairs| {
            pairs
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.min(b), a.max(b)))
                .collect::<Vec<_>>()
        });
        (Just(n), edges)
    })
}

/// Node count and arbitrary edges, cycles and self-loops included
fn digraph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..12).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..n * 3)))
}

fn run_layout(n: usize, edges: &[(usize, usize)], config: &LayoutConfig) -> layout::Layout {
    let names = ids(n);
    let nodes: Vec<&str> = names.iter().map(String::as_str).collect();
    let pairs: Vec<(&str, &str)> = edges
        .iter()
        .map(|&(a, b)| (names[a].as_str(), names[b].as_str()))
        .collect();
    layout::layout(&nodes, &pairs, config)
}

// =============================================================================
// Examples
// =============================================================================

#[test]
fn test_two_paper_example() {
    let papers = vec![make_paper("A", &[]), make_paper("B", &["A"])];
    let mut graph = PaperGraph::project(&papers);

    let node_ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(node_ids, vec!["A", "B"]);
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.has_edge("A", "B"));

    let config = LayoutConfig::default();
    let layout = graph.layout(&config);
    graph.apply_layout(&layout);
    let a = graph.node("A").unwrap().position;
    let b = graph.node("B").unwrap().position;
    assert!(config.direction.rank_coordinate(b) > config.direction.rank_coordinate(a));
}

#[test]
fn test_dangling_dependency_example() {
    let papers = vec![make_paper("A", &[]), make_paper("B", &["A", "ghost"])];
    let graph = PaperGraph::project(&papers);

    assert_eq!(graph.edge_count(), 1);
    let edge = &graph.edges()[0];
    assert_eq!((edge.source.as_str(), edge.target.as_str()), ("A", "B"));
    assert!(graph.node("ghost").is_none());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_projection_edges_match_valid_dependencies(
        n in 1usize..10,
        raw_deps in prop::collection::vec(prop::collection::vec(0usize..14, 0..5), 10),
    ) {
        // Indices >= n name papers that do not exist
        let names: Vec<String> = (0..14).map(|i| format!("p{i}")).collect();
        let papers: Vec<Paper> = (0..n)
            .map(|i| {
                let deps: Vec<&str> = raw_deps[i].iter().map(|&d| names[d].as_str()).collect();
                make_paper(&names[i], &deps)
            })
            .collect();
        let graph = PaperGraph::project(&papers);

        let mut expected = HashSet::new();
        for paper in &papers {
            for dep in &paper.dependencies {
                if papers.iter().any(|p| &p.id == dep) {
                    expected.insert((dep.clone(), paper.id.clone()));
                }
            }
        }
        let actual: HashSet<(String, String)> = graph
            .edges()
            .iter()
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect();

        prop_assert_eq!(graph.edge_count(), actual.len());
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(graph.node_count(), n);
    }

    #[test]
    fn prop_layout_is_deterministic(
        (n, edges) in digraph(),
        direction in any_direction(),
        ordering in any_ordering(),
    ) {
        let config = LayoutConfig { direction, ordering, ..LayoutConfig::default() };
        let first = run_layout(n, &edges, &config);
        let second = run_layout(n, &edges, &config);
        prop_assert_eq!(first.len(), n);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_layout_rank_monotone_on_dags((n, edges) in dag(), direction in any_direction()) {
        let config = LayoutConfig { direction, ..LayoutConfig::default() };
        let result = run_layout(n, &edges, &config);
        let names = ids(n);

        for &(a, b) in &edges {
            let source = result.get(&names[a]).unwrap();
            let target = result.get(&names[b]).unwrap();
            prop_assert!(target.rank > source.rank);
            prop_assert!(
                direction.rank_coordinate(target.position) > direction.rank_coordinate(source.position)
            );
        }
    }

    #[test]
    fn prop_layout_respects_margins_and_separation((n, edges) in dag()) {
        let config = LayoutConfig::default();
        let result = run_layout(n, &edges, &config);

        for placement in result.placements() {
            prop_assert!(placement.position.x >= config.margin_x - 1e-6);
            prop_assert!(placement.position.y >= config.margin_y - 1e-6);
        }

        let by_rank = result.by_rank();
        for pair in by_rank.windows(2) {
            if pair[0].rank == pair[1].rank {
                let gap = pair[1].position.x - pair[0].position.x;
                prop_assert!(gap >= config.node_width + config.node_separation - 1e-6);
            }
        }
    }

    #[test]
    fn prop_fix_overlaps_leaves_no_overlap(
        coords in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 0..20),
        padding in 0.0f64..40.0,
    ) {
        let (width, height) = (120.0, 80.0);
        let mut positions: Vec<Position> = coords.iter().map(|&(x, y)| Position::new(x, y)).collect();
        fix_overlaps(&mut positions, width, height, padding);

        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                prop_assert!(!overlaps(positions[i], positions[j], width, height, padding));
            }
        }
    }

    #[test]
    fn prop_title_edit_preserves_other_fields(title in "[A-Za-z][A-Za-z0-9 ]{0,40}") {
        let mut paper = make_paper("target", &["base"]);
        paper.authors = "Hinton, Osindero, Teh".into();
        paper.year = 2006;
        paper.url = Some("https://example.org/dbn".into());
        paper.venue = Some("Neural Computation".into());
        paper.description = Some("Greedy layer-wise pretraining".into());
        paper.tags = Some(vec!["deep-learning".into()]);
        paper.status = ReadingStatus::Archived;
        paper.priority = Priority::Low;
        paper.topic_id = Some("topic-ml".into());

        let store = MemoryStore::new(Document {
            papers: vec![make_paper("base", &[]), paper.clone()],
            ..Document::default()
        });
        let mut session = Session::open(&store, LayoutConfig::default());
        session.begin_edit("target").unwrap();
        session.form_mut().unwrap().title = Some(title.clone());
        session.save_edit().unwrap();

        let saved = store.snapshot().unwrap().paper("target").cloned().unwrap();
        prop_assert!(saved.updated_at > paper.updated_at);
        let expected = Paper {
            title,
            updated_at: saved.updated_at,
            dag_position: Some(Position::ORIGIN),
            ..paper
        };
        prop_assert_eq!(saved, expected);
    }
}
