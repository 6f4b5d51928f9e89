// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Dependency graph projected from the paper list

use crate::layout::{self, Direction, Layout, LayoutConfig};
use crate::types::{Paper, Position, ReadingStatus};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// A paper as a node on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct PaperNode {
    /// Paper ID
    pub id: String,
    /// Live canvas position (top-left)
    pub position: Position,
    /// The full paper record
    pub paper: Paper,
}

/// Reading-order edge from a prerequisite to a dependent paper
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    /// `<source>::<target>`
    pub id: String,
    /// Prerequisite paper ID
    pub source: String,
    /// Dependent paper ID
    pub target: String,
}

impl DependencyEdge {
    /// Create an edge from `source` to `target`
    #[must_use]
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            id: Self::edge_id(source, target),
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    /// Edge ID for a pair of papers
    #[must_use]
    pub fn edge_id(source: &str, target: &str) -> String {
        format!("{source}::{target}")
    }
}

/// The paper graph with petgraph backing for algorithms
#[derive(Debug, Clone, Default)]
pub struct PaperGraph {
    /// The underlying directed graph
    graph: DiGraph<String, String>,
    /// Map from paper ID to node index
    node_indices: HashMap<String, NodeIndex>,
    /// Nodes in paper order
    nodes: Vec<PaperNode>,
    /// Edges in paper/dependency order
    edges: Vec<DependencyEdge>,
}

impl PaperGraph {
    /// Create a new empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Project papers into nodes and dependency edges
    ///
    /// Dependencies on papers that are not in `papers` are skipped. When an
    /// ID occurs more than once, only its first paper is projected.
    #[must_use]
    pub fn project(papers: &[Paper]) -> Self {
        let mut known: HashSet<&str> = HashSet::new();
        let mut unique: Vec<&Paper> = Vec::with_capacity(papers.len());
        for paper in papers {
            if known.insert(paper.id.as_str()) {
                unique.push(paper);
            } else {
                warn!("Skipping duplicate paper {}", paper.id);
            }
        }

        let nodes = unique
            .iter()
            .map(|paper| PaperNode {
                id: paper.id.clone(),
                position: paper.dag_position.unwrap_or(Position::ORIGIN),
                paper: (*paper).clone(),
            })
            .collect();

        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for paper in unique {
            for dep in &paper.dependencies {
                if !known.contains(dep.as_str()) {
                    warn!("Skipping dependency of {} on unknown paper {}", paper.id, dep);
                    continue;
                }
                let edge = DependencyEdge::new(dep, &paper.id);
                if seen.insert(edge.id.clone()) {
                    edges.push(edge);
                }
            }
        }

        let mut projected = Self {
            graph: DiGraph::new(),
            node_indices: HashMap::new(),
            nodes,
            edges,
        };
        projected.rebuild_graph();
        projected
    }

    /// Rebuild the petgraph from nodes and edges
    fn rebuild_graph(&mut self) {
        self.graph.clear();
        self.node_indices.clear();

        for node in &self.nodes {
            let idx = self.graph.add_node(node.id.clone());
            self.node_indices.insert(node.id.clone(), idx);
        }

        for edge in &self.edges {
            if let (Some(&from_idx), Some(&to_idx)) = (
                self.node_indices.get(&edge.source),
                self.node_indices.get(&edge.target),
            ) {
                self.graph.add_edge(from_idx, to_idx, edge.id.clone());
            }
        }
    }

    /// All nodes
    #[must_use]
    pub fn nodes(&self) -> &[PaperNode] {
        &self.nodes
    }

    /// All edges
    #[must_use]
    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    /// Get a node by paper ID
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&PaperNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Get node count
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get edge count
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check if the graph is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether an edge from `source` to `target` exists
    #[must_use]
    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .iter()
            .any(|e| e.source == source && e.target == target)
    }

    /// IDs of papers that must be read before `id`
    #[must_use]
    pub fn prerequisites_of(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.target == id)
            .map(|e| e.source.as_str())
            .collect()
    }

    /// IDs of papers that list `id` as a prerequisite
    #[must_use]
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .map(|e| e.target.as_str())
            .collect()
    }

    /// Add an edge between two existing nodes; returns false if it was not added
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        let (Some(&from_idx), Some(&to_idx)) =
            (self.node_indices.get(source), self.node_indices.get(target))
        else {
            warn!("Invalid edge: {} -> {}", source, target);
            return false;
        };
        if self.has_edge(source, target) {
            return false;
        }

        let edge = DependencyEdge::new(source, target);
        self.graph.add_edge(from_idx, to_idx, edge.id.clone());
        self.edges.push(edge);
        true
    }

    /// Remove the edge from `source` to `target`
    pub fn remove_edge(&mut self, source: &str, target: &str) -> bool {
        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.source == source && e.target == target));
        let removed = self.edges.len() < before;
        if removed {
            self.rebuild_graph();
        }
        removed
    }

    /// Remove a node and every edge touching it
    pub fn remove_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges.retain(|e| e.source != id && e.target != id);
        self.rebuild_graph();
        true
    }

    /// Move a node on the canvas
    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Whether any node carries a position other than the origin
    #[must_use]
    pub fn has_valid_positions(&self) -> bool {
        layout::has_valid_positions(self.nodes.iter().map(|n| &n.position))
    }

    /// Compute a layered layout of this graph
    #[must_use]
    pub fn layout(&self, config: &LayoutConfig) -> Layout {
        let ids: Vec<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let edges: Vec<(&str, &str)> = self
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        layout::layout(&ids, &edges, config)
    }

    /// Copy positions from a layout onto the nodes
    pub fn apply_layout(&mut self, layout: &Layout) {
        for node in &mut self.nodes {
            if let Some(position) = layout.position(&node.id) {
                node.position = position;
            }
        }
    }

    /// Run the overlap correction pass on live positions
    pub fn fix_overlaps(&mut self, config: &LayoutConfig) -> usize {
        let mut positions: Vec<Position> = self.nodes.iter().map(|n| n.position).collect();
        let moved = layout::fix_overlaps(
            &mut positions,
            config.node_width,
            config.node_height,
            config.overlap_padding,
        );
        for (node, position) in self.nodes.iter_mut().zip(positions) {
            node.position = position;
        }
        moved
    }

    /// Check whether the dependencies contain a cycle
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// A reading order in which every prerequisite comes first
    ///
    /// Returns `None` when the dependencies contain a cycle.
    #[must_use]
    pub fn reading_order(&self) -> Option<Vec<&PaperNode>> {
        let sorted = toposort(&self.graph, None).ok()?;
        Some(
            sorted
                .into_iter()
                .filter_map(|idx| self.node(&self.graph[idx]))
                .collect(),
        )
    }

    /// Export to DOT format for Graphviz
    #[must_use]
    pub fn to_dot(&self, direction: Direction) -> String {
        let mut dot = String::from("digraph papers {\n");
        dot.push_str(&format!("  rankdir={};\n", direction.code()));
        dot.push_str("  node [shape=box, style=\"rounded,filled\"];\n\n");

        for node in &self.nodes {
            let label = format!("{}\\n({})", escape(&node.paper.title), node.paper.year);
            dot.push_str(&format!(
                "  \"{}\" [label=\"{}\", fillcolor=\"{}\", color=\"{}\"];\n",
                escape(&node.id),
                label,
                status_fill(node.paper.status),
                status_border(node.paper.status),
            ));
        }

        dot.push('\n');

        for edge in &self.edges {
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                escape(&edge.source),
                escape(&edge.target)
            ));
        }

        dot.push_str("}\n");
        dot
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn status_fill(status: ReadingStatus) -> &'static str {
    match status {
        ReadingStatus::Completed => "#f0fdf4",
        ReadingStatus::Reading => "#eff6ff",
        ReadingStatus::ToRead => "#ffffff",
        ReadingStatus::Archived => "#f9fafb",
    }
}

fn status_border(status: ReadingStatus) -> &'static str {
    match status {
        ReadingStatus::Completed => "#10b981",
        ReadingStatus::Reading => "#3b82f6",
        ReadingStatus::ToRead => "#d1d5db",
        ReadingStatus::Archived => "#9ca3af",
    }
}
