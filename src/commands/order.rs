// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Order command - a reading order that respects prerequisites

use super::CommandContext;
use anyhow::Result;

/// Run the order command
pub fn run(ctx: &CommandContext) -> Result<()> {
    let session = ctx.open_session()?;
    let Some(order) = session.graph().reading_order() else {
        anyhow::bail!("Dependencies contain a cycle; no reading order exists");
    };

    if ctx.json {
        let ids: Vec<&str> = order.iter().map(|n| n.id.as_str()).collect();
        println!("{}", serde_json::to_string_pretty(&ids)?);
        return Ok(());
    }

    for (i, node) in order.iter().enumerate() {
        println!(
            "{:>3}. {} {} [{}]",
            i + 1,
            ctx.id_label(&node.id),
            node.paper.title,
            ctx.status_label(node.paper.status)
        );
    }
    Ok(())
}
