// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Delete command - remove a paper

use super::{resolve_in, CommandContext};
use anyhow::Result;

/// Run the delete command
pub fn run(ctx: &CommandContext, paper: &str) -> Result<()> {
    let mut session = ctx.open_session()?;
    let id = resolve_in(&session, paper)?;
    let dependents: Vec<String> = session
        .graph()
        .dependents_of(&id)
        .into_iter()
        .map(String::from)
        .collect();

    session.delete_paper(&id)?;
    ctx.finish(&mut session)?;

    println!("Deleted paper: {}", ctx.id_label(&id));
    if !dependents.is_empty() {
        // Dependents keep the reference; it is skipped when drawing
        println!("  still listed as prerequisite of: {}", dependents.join(", "));
    }
    Ok(())
}
