// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Stats command - paper counts by status

use super::CommandContext;
use crate::types::ReadingStatus;
use anyhow::Result;

/// Run the stats command
pub fn run(ctx: &CommandContext) -> Result<()> {
    let session = ctx.open_session()?;
    let stats = session.stats();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Papers: {}", stats.total);
    for (status, count) in [
        (ReadingStatus::ToRead, stats.to_read),
        (ReadingStatus::Reading, stats.reading),
        (ReadingStatus::Completed, stats.completed),
        (ReadingStatus::Archived, stats.archived),
    ] {
        println!("  {:<10} {}", ctx.status_label(status), count);
    }
    println!("Dependencies: {}", session.graph().edge_count());
    if session.graph().has_cycle() {
        println!("  (contains a cycle)");
    }
    Ok(())
}
