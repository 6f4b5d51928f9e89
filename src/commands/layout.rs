// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Layout command - print computed canvas positions

use super::CommandContext;
use crate::layout::Direction;
use anyhow::Result;
use serde_json::json;

/// Run the layout command
pub fn run(ctx: &CommandContext, direction: Option<Direction>, fix_overlaps: bool) -> Result<()> {
    let mut session = ctx.open_session()?;

    if let Some(direction) = direction {
        let mut config = session.layout_config().clone();
        config.direction = direction;
        session.set_layout_config(config);
    }
    let moves = if fix_overlaps { session.fix_overlaps() } else { 0 };

    let graph = session.graph();
    let layout = session.layout();

    if ctx.json {
        let nodes: Vec<_> = layout
            .by_rank()
            .into_iter()
            .filter_map(|p| graph.node(&p.id).map(|n| (p, n)))
            .map(|(p, n)| {
                json!({
                    "id": n.id,
                    "rank": p.rank,
                    "order": p.order,
                    "x": n.position.x,
                    "y": n.position.y,
                })
            })
            .collect();
        let value = json!({
            "direction": session.layout_config().direction,
            "width": layout.width(),
            "height": layout.height(),
            "overlapMoves": moves,
            "nodes": nodes,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "Layout {} ({:.0} x {:.0})",
        session.layout_config().direction.code(),
        layout.width(),
        layout.height()
    );
    for placement in layout.by_rank() {
        if let Some(node) = graph.node(&placement.id) {
            println!(
                "  {:<3} {:<3} {:>8.1} {:>8.1}  {}",
                placement.rank,
                placement.order,
                node.position.x,
                node.position.y,
                ctx.id_label(&node.id)
            );
        }
    }
    if fix_overlaps {
        println!("Overlap correction moved nodes {} times", moves);
    }
    Ok(())
}
