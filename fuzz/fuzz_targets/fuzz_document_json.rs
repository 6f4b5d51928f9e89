// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
#![no_main]

use libfuzzer_sys::fuzz_target;
use papergraph::graph::PaperGraph;
use papergraph::layout::LayoutConfig;
use papergraph::types::Document;

fuzz_target!(|data: &[u8]| {
    let Ok(document) = serde_json::from_slice::<Document>(data) else {
        return;
    };
    if document.papers.len() > 64 {
        return;
    }

    let mut graph = PaperGraph::project(&document.papers);
    let config = LayoutConfig::default();
    let layout = graph.layout(&config);
    assert_eq!(layout.len(), graph.node_count());
    graph.apply_layout(&layout);
    graph.fix_overlaps(&config);

    let json = serde_json::to_string(&document).expect("document serializes");
    let reparsed: Document = serde_json::from_str(&json).expect("serialized document parses");
    assert_eq!(reparsed.papers.len(), document.papers.len());
});
