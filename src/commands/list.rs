// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! List command - papers in layout order

use super::CommandContext;
use crate::types::ReadingStatus;
use anyhow::Result;
use serde_json::json;

/// Run the list command
pub fn run(ctx: &CommandContext, status: Option<ReadingStatus>) -> Result<()> {
    let session = ctx.open_session()?;
    let graph = session.graph();

    let rows: Vec<_> = session
        .layout()
        .by_rank()
        .into_iter()
        .filter_map(|placement| graph.node(&placement.id).map(|node| (placement, node)))
        .filter(|(_, node)| status.map_or(true, |s| node.paper.status == s))
        .collect();

    if ctx.json {
        let items: Vec<_> = rows
            .iter()
            .map(|(placement, node)| {
                json!({
                    "id": node.id,
                    "title": node.paper.title,
                    "year": node.paper.year,
                    "status": node.paper.status,
                    "priority": node.paper.priority,
                    "rank": placement.rank,
                    "position": node.position,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No papers.");
        return Ok(());
    }

    let mut current_rank = None;
    for (placement, node) in rows {
        if current_rank != Some(placement.rank) {
            println!("Rank {}:", placement.rank);
            current_rank = Some(placement.rank);
        }
        println!(
            "  {} [{}] {} ({}) {}",
            ctx.id_label(&node.id),
            node.paper.priority,
            node.paper.title,
            node.paper.year,
            ctx.status_label(node.paper.status),
        );
    }
    Ok(())
}
