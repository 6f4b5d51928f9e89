// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Connect and disconnect commands - manage prerequisites

use super::{resolve_in, CommandContext};
use anyhow::Result;

/// Make `prerequisite` a dependency of `dependent`
pub fn connect(ctx: &CommandContext, prerequisite: &str, dependent: &str) -> Result<()> {
    let mut session = ctx.open_session()?;
    let source = resolve_in(&session, prerequisite)?;
    let target = resolve_in(&session, dependent)?;

    let added = session.connect(&source, &target)?;
    ctx.finish(&mut session)?;

    if added {
        println!("Connected: {} -> {}", ctx.id_label(&source), ctx.id_label(&target));
        if session.graph().has_cycle() {
            eprintln!("Warning: dependencies now contain a cycle");
        }
    } else {
        println!("{} already depends on {}", target, source);
    }
    Ok(())
}

/// Remove `prerequisite` from the dependencies of `dependent`
pub fn disconnect(ctx: &CommandContext, prerequisite: &str, dependent: &str) -> Result<()> {
    let mut session = ctx.open_session()?;
    let source = resolve_in(&session, prerequisite)?;
    let target = resolve_in(&session, dependent)?;

    let removed = session.disconnect(&source, &target)?;
    ctx.finish(&mut session)?;

    if removed {
        println!("Disconnected: {} -> {}", ctx.id_label(&source), ctx.id_label(&target));
    } else {
        println!("{} does not depend on {}", target, source);
    }
    Ok(())
}
