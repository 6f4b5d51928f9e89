// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Layered (Sugiyama-style) layout for the paper graph
//!
//! Phases:
//!   1. Cycle removal (greedy feedback arc set)
//!   2. Longest-path ranking from the sources
//!   3. Virtual nodes for edges spanning several ranks
//!   4. Crossing reduction (median or barycenter sweeps)
//!   5. In-rank coordinate assignment honouring node and edge separation
//!   6. Orientation, margins and centre to top-left conversion
//!
//! Every phase iterates in input order and breaks ties stably, so the same
//! input always yields the same positions.

use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

// =============================================================================
// Configuration
// =============================================================================

/// Direction in which ranks advance
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Direction {
    /// Sources at the top
    #[default]
    #[serde(rename = "TB")]
    #[value(name = "TB", aliases = ["tb", "top-to-bottom"])]
    TopToBottom,
    /// Sources at the bottom
    #[serde(rename = "BT")]
    #[value(name = "BT", aliases = ["bt", "bottom-to-top"])]
    BottomToTop,
    /// Sources on the left
    #[serde(rename = "LR")]
    #[value(name = "LR", aliases = ["lr", "left-to-right"])]
    LeftToRight,
    /// Sources on the right
    #[serde(rename = "RL")]
    #[value(name = "RL", aliases = ["rl", "right-to-left"])]
    RightToLeft,
}

impl Direction {
    /// Graphviz `rankdir` value
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::TopToBottom => "TB",
            Self::BottomToTop => "BT",
            Self::LeftToRight => "LR",
            Self::RightToLeft => "RL",
        }
    }

    /// Whether ranks advance along the x axis
    #[must_use]
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }

    /// Coordinate that grows with the rank of a node in this direction
    #[must_use]
    pub fn rank_coordinate(&self, position: Position) -> f64 {
        match self {
            Self::TopToBottom => position.y,
            Self::BottomToTop => -position.y,
            Self::LeftToRight => position.x,
            Self::RightToLeft => -position.x,
        }
    }
}

/// Heuristic used to order nodes within a rank
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Ordering {
    /// Median of neighbour positions
    #[default]
    Median,
    /// Mean of neighbour positions
    Barycenter,
}

/// Layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Rank direction
    pub direction: Direction,
    /// Width of every node
    pub node_width: f64,
    /// Height of every node
    pub node_height: f64,
    /// Minimum gap between nodes in the same rank
    pub node_separation: f64,
    /// Minimum gap between ranks
    pub rank_separation: f64,
    /// Minimum gap involving edge routing points
    pub edge_separation: f64,
    /// Horizontal margin around the drawing
    pub margin_x: f64,
    /// Vertical margin around the drawing
    pub margin_y: f64,
    /// Crossing reduction heuristic
    pub ordering: Ordering,
    /// Upper bound on crossing reduction sweeps
    pub max_sweeps: usize,
    /// Padding used by the overlap correction pass
    pub overlap_padding: f64,
    /// Keep positions stored in the document instead of recomputing them
    pub respect_saved_positions: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::TopToBottom,
            node_width: 280.0,
            node_height: 200.0,
            node_separation: 150.0,
            rank_separation: 220.0,
            edge_separation: 50.0,
            margin_x: 100.0,
            margin_y: 100.0,
            ordering: Ordering::Median,
            max_sweeps: 24,
            overlap_padding: 20.0,
            respect_saved_positions: false,
        }
    }
}

impl LayoutConfig {
    /// Clamp dimensions to positive and gaps to non-negative values
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            node_width: self.node_width.max(1.0),
            node_height: self.node_height.max(1.0),
            node_separation: self.node_separation.max(0.0),
            rank_separation: self.rank_separation.max(0.0),
            edge_separation: self.edge_separation.max(0.0),
            margin_x: self.margin_x.max(0.0),
            margin_y: self.margin_y.max(0.0),
            overlap_padding: self.overlap_padding.max(0.0),
            ..self.clone()
        }
    }

    /// Extent of a node along its rank
    fn in_rank_size(&self) -> f64 {
        if self.direction.is_horizontal() {
            self.node_height
        } else {
            self.node_width
        }
    }

    /// Extent of a node across ranks
    fn rank_axis_size(&self) -> f64 {
        if self.direction.is_horizontal() {
            self.node_width
        } else {
            self.node_height
        }
    }
}

// =============================================================================
// Result
// =============================================================================

/// Placement of one node
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Node ID
    pub id: String,
    /// Top-left corner
    pub position: Position,
    /// Rank (0 for sources)
    pub rank: usize,
    /// Index within the rank after crossing reduction
    pub order: usize,
}

/// Output of a layout run, in input node order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    placements: Vec<Placement>,
    width: f64,
    height: f64,
}

impl Layout {
    /// All placements, in input node order
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Placement of a node
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    /// Top-left position of a node
    #[must_use]
    pub fn position(&self, id: &str) -> Option<Position> {
        self.get(id).map(|p| p.position)
    }

    /// Placements sorted by rank, then by order within the rank
    #[must_use]
    pub fn by_rank(&self) -> Vec<&Placement> {
        let mut sorted: Vec<&Placement> = self.placements.iter().collect();
        sorted.sort_by_key(|p| (p.rank, p.order));
        sorted
    }

    /// Number of placed nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether nothing was placed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Drawing width including margins
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Drawing height including margins
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }
}

// =============================================================================
// Entry point
// =============================================================================

/// Compute positions for `node_ids` connected by `edges` (prerequisite, dependent)
///
/// Edges whose endpoints are not in `node_ids` are logged and skipped.
/// Self-loops do not influence the layout.
#[must_use]
pub fn layout(node_ids: &[&str], edges: &[(&str, &str)], config: &LayoutConfig) -> Layout {
    if node_ids.is_empty() {
        return Layout::default();
    }

    let config = config.sanitized();
    let n = node_ids.len();
    let edges = index_edges(node_ids, edges);

    let sequence = acyclic_sequence(n, &edges);
    let dag = orient_edges(n, &edges, &sequence);
    let ranks = longest_path_ranks(n, &dag, &sequence);

    let mut layered = LayeredGraph::build(n, &dag, ranks);
    layered.init_order();
    layered.reduce_crossings(config.ordering, config.max_sweeps);

    let in_rank = layered.assign_in_rank(&config);
    layered.place(node_ids, &in_rank, &config)
}

/// Map ID pairs to index pairs, dropping invalid edges, self-loops and duplicates
fn index_edges(node_ids: &[&str], edges: &[(&str, &str)]) -> Vec<(usize, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(node_ids.len());
    for (i, id) in node_ids.iter().enumerate() {
        index.entry(*id).or_insert(i);
    }

    let mut seen = HashSet::new();
    let mut indexed = Vec::with_capacity(edges.len());
    for (source, target) in edges {
        match (index.get(source), index.get(target)) {
            (Some(&s), Some(&t)) if s == t => {
                debug!("Ignoring self-loop on {}", source);
            }
            (Some(&s), Some(&t)) => {
                if seen.insert((s, t)) {
                    indexed.push((s, t));
                }
            }
            _ => warn!("Invalid edge: {} -> {}", source, target),
        }
    }
    indexed
}

// =============================================================================
// Cycle removal
// =============================================================================

/// Node sequence from the greedy feedback arc set heuristic (Eades et al.)
///
/// Edges pointing backwards in this sequence form the feedback set.
fn acyclic_sequence(n: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut succs = vec![Vec::new(); n];
    let mut preds = vec![Vec::new(); n];
    let mut out_deg = vec![0i64; n];
    let mut in_deg = vec![0i64; n];
    for &(s, t) in edges {
        succs[s].push(t);
        preds[t].push(s);
        out_deg[s] += 1;
        in_deg[t] += 1;
    }

    let mut removed = vec![false; n];
    let mut remaining = n;
    let mut head = Vec::with_capacity(n);
    let mut tail = Vec::new();

    let remove = |v: usize, removed: &mut [bool], out_deg: &mut [i64], in_deg: &mut [i64]| {
        removed[v] = true;
        for &u in &preds[v] {
            if !removed[u] {
                out_deg[u] -= 1;
            }
        }
        for &w in &succs[v] {
            if !removed[w] {
                in_deg[w] -= 1;
            }
        }
    };

    while remaining > 0 {
        loop {
            let sinks: Vec<usize> = (0..n).filter(|&v| !removed[v] && out_deg[v] == 0).collect();
            if sinks.is_empty() {
                break;
            }
            for v in sinks {
                remove(v, &mut removed, &mut out_deg, &mut in_deg);
                remaining -= 1;
                tail.push(v);
            }
        }

        loop {
            let sources: Vec<usize> = (0..n)
                .filter(|&v| !removed[v] && in_deg[v] == 0)
                .collect();
            if sources.is_empty() {
                break;
            }
            for v in sources {
                remove(v, &mut removed, &mut out_deg, &mut in_deg);
                remaining -= 1;
                head.push(v);
            }
        }

        // Only cycles left: take the node with the largest out/in surplus
        let pick = (0..n)
            .filter(|&v| !removed[v])
            .max_by(|&a, &b| {
                (out_deg[a] - in_deg[a])
                    .cmp(&(out_deg[b] - in_deg[b]))
                    .then(b.cmp(&a))
            });
        if let Some(v) = pick {
            remove(v, &mut removed, &mut out_deg, &mut in_deg);
            remaining -= 1;
            head.push(v);
        }
    }

    tail.reverse();
    head.extend(tail);
    head
}

/// Reverse every edge that points backwards in `sequence`
fn orient_edges(n: usize, edges: &[(usize, usize)], sequence: &[usize]) -> Vec<(usize, usize)> {
    let mut position = vec![0usize; n];
    for (i, &v) in sequence.iter().enumerate() {
        position[v] = i;
    }

    let mut seen = HashSet::new();
    let mut dag = Vec::with_capacity(edges.len());
    for &(s, t) in edges {
        let edge = if position[s] > position[t] {
            debug!("Reversing edge {} -> {} to break a cycle", s, t);
            (t, s)
        } else {
            (s, t)
        };
        if seen.insert(edge) {
            dag.push(edge);
        }
    }
    dag
}

// =============================================================================
// Ranking
// =============================================================================

/// Rank = length of the longest path from any source
fn longest_path_ranks(n: usize, dag: &[(usize, usize)], sequence: &[usize]) -> Vec<usize> {
    let mut preds = vec![Vec::new(); n];
    for &(s, t) in dag {
        preds[t].push(s);
    }

    // `sequence` is a topological order of `dag`
    let mut ranks = vec![0usize; n];
    for &v in sequence {
        ranks[v] = preds[v].iter().map(|&u| ranks[u] + 1).max().unwrap_or(0);
    }
    ranks
}

// =============================================================================
// Layered graph
// =============================================================================

/// Proper layered graph: every edge joins adjacent ranks
struct LayeredGraph {
    /// Number of real nodes; indices at or above this are virtual
    real: usize,
    ranks: Vec<usize>,
    succs: Vec<Vec<usize>>,
    preds: Vec<Vec<usize>>,
    layers: Vec<Vec<usize>>,
    order: Vec<usize>,
}

impl LayeredGraph {
    fn build(n: usize, dag: &[(usize, usize)], mut ranks: Vec<usize>) -> Self {
        let mut succs = vec![Vec::new(); n];
        let mut preds = vec![Vec::new(); n];

        for &(s, t) in dag {
            let mut prev = s;
            for rank in ranks[s] + 1..ranks[t] {
                let virtual_node = ranks.len();
                ranks.push(rank);
                succs.push(Vec::new());
                preds.push(Vec::new());
                succs[prev].push(virtual_node);
                preds[virtual_node].push(prev);
                prev = virtual_node;
            }
            succs[prev].push(t);
            preds[t].push(prev);
        }

        let rank_count = ranks.iter().copied().max().map_or(0, |r| r + 1);
        let total = ranks.len();
        Self {
            real: n,
            ranks,
            succs,
            preds,
            layers: vec![Vec::new(); rank_count],
            order: vec![0; total],
        }
    }

    fn is_virtual(&self, v: usize) -> bool {
        v >= self.real
    }

    /// Depth-first initial ordering, visiting nodes by rank then index
    fn init_order(&mut self) {
        let total = self.ranks.len();
        let mut start: Vec<usize> = (0..total).collect();
        start.sort_by_key(|&v| (self.ranks[v], v));

        let mut visited = vec![false; total];
        for root in start {
            if visited[root] {
                continue;
            }
            let mut stack = vec![root];
            while let Some(v) = stack.pop() {
                if visited[v] {
                    continue;
                }
                visited[v] = true;
                self.layers[self.ranks[v]].push(v);
                for &w in self.succs[v].iter().rev() {
                    if !visited[w] {
                        stack.push(w);
                    }
                }
            }
        }
        self.reindex();
    }

    fn reindex(&mut self) {
        for layer in &self.layers {
            for (i, &v) in layer.iter().enumerate() {
                self.order[v] = i;
            }
        }
    }

    /// Alternate down and up sweeps, keeping the ordering with fewest crossings
    fn reduce_crossings(&mut self, ordering: Ordering, max_sweeps: usize) {
        if self.layers.len() < 2 {
            return;
        }

        let mut best = self.layers.clone();
        let mut best_crossings = self.crossings();
        let mut stale = 0;

        for sweep in 0..max_sweeps {
            if best_crossings == 0 || stale >= 4 {
                break;
            }

            if sweep % 2 == 0 {
                for rank in 1..self.layers.len() {
                    self.sort_layer(rank, true, ordering);
                }
            } else {
                for rank in (0..self.layers.len() - 1).rev() {
                    self.sort_layer(rank, false, ordering);
                }
            }

            let crossings = self.crossings();
            if crossings < best_crossings {
                best = self.layers.clone();
                best_crossings = crossings;
                stale = 0;
            } else {
                stale += 1;
            }
        }

        debug!("Crossing reduction finished with {} crossings", best_crossings);
        self.layers = best;
        self.reindex();
    }

    /// Reorder one rank by its neighbours in the adjacent fixed rank
    ///
    /// Nodes without neighbours keep their slot.
    fn sort_layer(&mut self, rank: usize, downward: bool, ordering: Ordering) {
        let layer = &self.layers[rank];
        let weights: Vec<Option<f64>> = layer
            .iter()
            .map(|&v| {
                let neighbours = if downward { &self.preds[v] } else { &self.succs[v] };
                let mut positions: Vec<f64> = neighbours
                    .iter()
                    .map(|&u| self.order[u] as f64)
                    .collect();
                weight(&mut positions, ordering)
            })
            .collect();

        let mut movable: Vec<(f64, usize, usize)> = layer
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| weights[i].map(|w| (w, i, v)))
            .collect();
        movable.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut movable = movable.into_iter();
        let sorted: Vec<usize> = layer
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                if weights[i].is_some() {
                    movable.next().map_or(v, |(_, _, w)| w)
                } else {
                    v
                }
            })
            .collect();

        for (i, &v) in sorted.iter().enumerate() {
            self.order[v] = i;
        }
        self.layers[rank] = sorted;
    }

    /// Total number of edge crossings between adjacent ranks
    fn crossings(&self) -> usize {
        let mut total = 0;
        for layer in self.layers.iter().take(self.layers.len().saturating_sub(1)) {
            let mut segments: Vec<(usize, usize)> = layer
                .iter()
                .flat_map(|&v| self.succs[v].iter().map(move |&w| (v, w)))
                .map(|(v, w)| (self.order[v], self.order[w]))
                .collect();
            segments.sort_unstable();
            for (i, a) in segments.iter().enumerate() {
                for b in &segments[i + 1..] {
                    if a.0 < b.0 && a.1 > b.1 {
                        total += 1;
                    }
                }
            }
        }
        total
    }

    /// Centre coordinate of every node along its rank
    fn assign_in_rank(&self, config: &LayoutConfig) -> Vec<f64> {
        let total = self.ranks.len();
        let size = config.in_rank_size();
        let extent = |v: usize| if self.is_virtual(v) { 0.0 } else { size };
        let mut x = vec![0.0; total];

        // Packed start, each rank centred on the widest one
        let mut widths = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let desired: Vec<f64> = vec![f64::NEG_INFINITY; layer.len()];
            let packed = self.forward_pass(layer, &desired, config, &extent);
            let width = match (layer.first(), layer.last()) {
                (Some(&first), Some(&last)) => {
                    let left = packed[0] - extent(first) / 2.0;
                    packed[layer.len() - 1] + extent(last) / 2.0 - left
                }
                _ => 0.0,
            };
            for (&v, px) in layer.iter().zip(packed) {
                x[v] = px;
            }
            widths.push(width);
        }
        let widest = widths.iter().copied().fold(0.0, f64::max);
        for (layer, width) in self.layers.iter().zip(&widths) {
            let shift = (widest - width) / 2.0;
            for &v in layer {
                x[v] += shift;
            }
        }

        // Pull nodes towards their neighbours, alternating direction
        for iteration in 0..8 {
            let downward = iteration % 2 == 0;
            let ranks: Vec<usize> = if downward {
                (1..self.layers.len()).collect()
            } else {
                (0..self.layers.len().saturating_sub(1)).rev().collect()
            };
            for rank in ranks {
                let layer = &self.layers[rank];
                let desired: Vec<f64> = layer
                    .iter()
                    .map(|&v| {
                        let neighbours = if downward { &self.preds[v] } else { &self.succs[v] };
                        if neighbours.is_empty() {
                            x[v]
                        } else {
                            neighbours.iter().map(|&u| x[u]).sum::<f64>() / neighbours.len() as f64
                        }
                    })
                    .collect();
                let forward = self.forward_pass(layer, &desired, config, &extent);
                let backward = self.backward_pass(layer, &desired, config, &extent);
                for (i, &v) in layer.iter().enumerate() {
                    x[v] = (forward[i] + backward[i]) / 2.0;
                }
            }
        }

        x
    }

    /// Minimum centre distance between two nodes of one rank
    fn separation(&self, a: usize, b: usize, config: &LayoutConfig, extent: &impl Fn(usize) -> f64) -> f64 {
        let gap = if self.is_virtual(a) || self.is_virtual(b) {
            config.edge_separation
        } else {
            config.node_separation
        };
        extent(a) / 2.0 + extent(b) / 2.0 + gap
    }

    /// Leftmost feasible coordinates at or right of `desired`
    fn forward_pass(
        &self,
        layer: &[usize],
        desired: &[f64],
        config: &LayoutConfig,
        extent: &impl Fn(usize) -> f64,
    ) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::with_capacity(layer.len());
        let mut last_real: Option<usize> = None;
        for (i, &v) in layer.iter().enumerate() {
            let mut value = if desired[i].is_finite() { desired[i] } else { extent(v) / 2.0 };
            if i > 0 {
                let floor = out[i - 1] + self.separation(layer[i - 1], v, config, extent);
                value = if desired[i].is_finite() { value.max(floor) } else { floor };
            }
            if !self.is_virtual(v) {
                if let Some(j) = last_real {
                    value = value.max(out[j] + self.separation(layer[j], v, config, extent));
                }
                last_real = Some(i);
            }
            out.push(value);
        }
        out
    }

    /// Rightmost feasible coordinates at or left of `desired`
    fn backward_pass(
        &self,
        layer: &[usize],
        desired: &[f64],
        config: &LayoutConfig,
        extent: &impl Fn(usize) -> f64,
    ) -> Vec<f64> {
        let len = layer.len();
        let mut out = vec![0.0; len];
        let mut next_real: Option<usize> = None;
        for i in (0..len).rev() {
            let v = layer[i];
            let mut value = desired[i];
            if i + 1 < len {
                value = value.min(out[i + 1] - self.separation(v, layer[i + 1], config, extent));
            }
            if !self.is_virtual(v) {
                if let Some(j) = next_real {
                    value = value.min(out[j] - self.separation(v, layer[j], config, extent));
                }
                next_real = Some(i);
            }
            out[i] = value;
        }
        out
    }

    /// Orient, add margins and convert centres to top-left corners
    fn place(&self, node_ids: &[&str], in_rank: &[f64], config: &LayoutConfig) -> Layout {
        let u_size = config.in_rank_size();
        let v_size = config.rank_axis_size();

        let left = (0..self.real)
            .map(|v| in_rank[v] - u_size / 2.0)
            .fold(f64::INFINITY, f64::min);
        let u_extent = (0..self.real)
            .map(|v| in_rank[v] + u_size / 2.0 - left)
            .fold(0.0, f64::max);
        let max_rank = (0..self.real).map(|v| self.ranks[v]).max().unwrap_or(0);
        #[allow(clippy::cast_precision_loss)]
        let v_extent = (max_rank + 1) as f64 * v_size + max_rank as f64 * config.rank_separation;

        let placements = node_ids
            .iter()
            .enumerate()
            .map(|(v, id)| {
                let u = in_rank[v] - left;
                #[allow(clippy::cast_precision_loss)]
                let r = self.ranks[v] as f64 * (v_size + config.rank_separation) + v_size / 2.0;
                let (cx, cy) = match config.direction {
                    Direction::TopToBottom => (u, r),
                    Direction::BottomToTop => (u, v_extent - r),
                    Direction::LeftToRight => (r, u),
                    Direction::RightToLeft => (v_extent - r, u),
                };
                Placement {
                    id: (*id).to_string(),
                    position: Position::new(
                        cx + config.margin_x - config.node_width / 2.0,
                        cy + config.margin_y - config.node_height / 2.0,
                    ),
                    rank: self.ranks[v],
                    order: self.order[v],
                }
            })
            .collect();

        let (width, height) = if config.direction.is_horizontal() {
            (v_extent, u_extent)
        } else {
            (u_extent, v_extent)
        };

        Layout {
            placements,
            width: width + 2.0 * config.margin_x,
            height: height + 2.0 * config.margin_y,
        }
    }
}

/// Median or mean of neighbour positions; `None` without neighbours
#[allow(clippy::cast_precision_loss)]
fn weight(positions: &mut [f64], ordering: Ordering) -> Option<f64> {
    if positions.is_empty() {
        return None;
    }
    match ordering {
        Ordering::Barycenter => Some(positions.iter().sum::<f64>() / positions.len() as f64),
        Ordering::Median => {
            positions.sort_by(f64::total_cmp);
            let mid = positions.len() / 2;
            if positions.len() % 2 == 1 {
                Some(positions[mid])
            } else {
                Some((positions[mid - 1] + positions[mid]) / 2.0)
            }
        }
    }
}

// =============================================================================
// Overlap correction
// =============================================================================

/// Whether two padded node boxes intersect
#[must_use]
pub fn overlaps(a: Position, b: Position, width: f64, height: f64, padding: f64) -> bool {
    a.x < b.x + width + padding
        && a.x + width + padding > b.x
        && a.y < b.y + height + padding
        && a.y + height + padding > b.y
}

/// Push later nodes right until no padded boxes intersect
///
/// For each overlapping pair the node with the higher index moves to just
/// past the other one. Passes repeat until nothing moves. Returns the number
/// of moves.
pub fn fix_overlaps(positions: &mut [Position], width: f64, height: f64, padding: f64) -> usize {
    let mut moves = 0;
    loop {
        let mut moved = false;
        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                if overlaps(positions[i], positions[j], width, height, padding) {
                    positions[j].x = positions[i].x + width + padding;
                    moves += 1;
                    moved = true;
                }
            }
        }
        if !moved {
            break;
        }
    }
    if moves > 0 {
        debug!("Overlap correction moved nodes {} times", moves);
    }
    moves
}

/// Whether any position differs from the origin
#[must_use]
pub fn has_valid_positions<'a>(positions: impl IntoIterator<Item = &'a Position>) -> bool {
    positions.into_iter().any(|p| !p.is_origin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> LayoutConfig {
        LayoutConfig {
            node_width: 100.0,
            node_height: 50.0,
            node_separation: 20.0,
            rank_separation: 40.0,
            edge_separation: 10.0,
            margin_x: 5.0,
            margin_y: 5.0,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn test_empty_input() {
        let result = layout(&[], &[], &LayoutConfig::default());
        assert!(result.is_empty());
        assert!(result.width().abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_node_respects_margins() {
        let config = small();
        let result = layout(&["a"], &[], &config);
        let p = result.position("a").unwrap();
        assert!((p.x - 5.0).abs() < 1e-9);
        assert!((p.y - 5.0).abs() < 1e-9);
        assert!((result.width() - 110.0).abs() < 1e-9);
        assert!((result.height() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_chain_ranks() {
        let result = layout(&["a", "b", "c"], &[("a", "b"), ("b", "c")], &small());
        assert_eq!(result.get("a").unwrap().rank, 0);
        assert_eq!(result.get("b").unwrap().rank, 1);
        assert_eq!(result.get("c").unwrap().rank, 2);
        let ya = result.position("a").unwrap().y;
        let yb = result.position("b").unwrap().y;
        assert!((yb - ya - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_longest_path_rank() {
        // a -> c directly and through b: c sits below b
        let result = layout(&["a", "b", "c"], &[("a", "c"), ("a", "b"), ("b", "c")], &small());
        assert_eq!(result.get("c").unwrap().rank, 2);
    }

    #[test]
    fn test_directions() {
        let edges = [("a", "b")];
        for direction in [
            Direction::TopToBottom,
            Direction::BottomToTop,
            Direction::LeftToRight,
            Direction::RightToLeft,
        ] {
            let config = LayoutConfig { direction, ..small() };
            let result = layout(&["a", "b"], &edges, &config);
            let a = direction.rank_coordinate(result.position("a").unwrap());
            let b = direction.rank_coordinate(result.position("b").unwrap());
            assert!(b > a, "{direction:?}");
        }
    }

    #[test]
    fn test_same_rank_separation() {
        let config = small();
        let result = layout(&["root", "x", "y", "z"], &[("root", "x"), ("root", "y"), ("root", "z")], &config);
        let mut xs: Vec<f64> = ["x", "y", "z"]
            .iter()
            .map(|id| result.position(id).unwrap().x)
            .collect();
        xs.sort_by(f64::total_cmp);
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= config.node_width + config.node_separation - 1e-9);
        }
    }

    #[test]
    fn test_invalid_edges_skipped() {
        let result = layout(&["a"], &[("a", "ghost"), ("ghost", "a")], &small());
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("a").unwrap().rank, 0);
    }

    #[test]
    fn test_cycle_is_laid_out() {
        let result = layout(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")], &small());
        assert_eq!(result.len(), 3);
        let mut ranks: Vec<usize> = result.placements().iter().map(|p| p.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_crossings_removed() {
        // a->d, b->c laid out naively cross; the sweeps untangle them
        let result = layout(&["a", "b", "c", "d"], &[("a", "d"), ("b", "c")], &small());
        let a = result.position("a").unwrap().x;
        let b = result.position("b").unwrap().x;
        let c = result.position("c").unwrap().x;
        let d = result.position("d").unwrap().x;
        assert_eq!(a < b, d < c);
    }

    #[test]
    fn test_weight() {
        assert_eq!(weight(&mut [], Ordering::Median), None);
        assert_eq!(weight(&mut [3.0, 1.0, 2.0], Ordering::Median), Some(2.0));
        assert_eq!(weight(&mut [0.0, 4.0], Ordering::Median), Some(2.0));
        assert_eq!(weight(&mut [0.0, 1.0, 5.0], Ordering::Barycenter), Some(2.0));
    }

    #[test]
    fn test_fix_overlaps_pushes_later_node() {
        let mut positions = vec![Position::new(0.0, 0.0), Position::new(10.0, 10.0)];
        let moves = fix_overlaps(&mut positions, 100.0, 50.0, 20.0);
        assert_eq!(moves, 1);
        assert_eq!(positions[0], Position::new(0.0, 0.0));
        assert_eq!(positions[1], Position::new(120.0, 10.0));
    }

    #[test]
    fn test_fix_overlaps_cascade() {
        let mut positions = vec![
            Position::new(200.0, 0.0),
            Position::new(0.0, 0.0),
            Position::new(90.0, 0.0),
        ];
        fix_overlaps(&mut positions, 100.0, 50.0, 20.0);
        for i in 0..positions.len() {
            for j in i + 1..positions.len() {
                assert!(!overlaps(positions[i], positions[j], 100.0, 50.0, 20.0));
            }
        }
    }

    #[test]
    fn test_has_valid_positions() {
        assert!(!has_valid_positions(&[]));
        assert!(!has_valid_positions(&[Position::ORIGIN, Position::ORIGIN]));
        assert!(has_valid_positions(&[Position::ORIGIN, Position::new(1.0, 0.0)]));
    }
}
