// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Snapshot of the Graphviz export

use chrono::Utc;
use papergraph::graph::PaperGraph;
use papergraph::layout::Direction;
use papergraph::types::{Paper, ReadingStatus};

fn paper(id: &str, title: &str, year: i32, status: ReadingStatus, deps: &[&str]) -> Paper {
    let mut paper = Paper::new(id, Utc::now());
    paper.title = title.into();
    paper.year = year;
    paper.status = status;
    paper.dependencies = deps.iter().map(|d| (*d).to_string()).collect();
    paper
}

#[test]
fn test_reading_graph_dot() {
    let papers = vec![
        paper("seq2seq", "Sequence to Sequence Learning", 2014, ReadingStatus::Completed, &[]),
        paper("transformer", "The \"Transformer\"", 2017, ReadingStatus::Reading, &["seq2seq"]),
        paper("bert", "BERT", 2019, ReadingStatus::ToRead, &["transformer", "ghost"]),
    ];
    let dot = PaperGraph::project(&papers).to_dot(Direction::LeftToRight);
    insta::assert_snapshot!("reading_graph_dot", dot);
}
