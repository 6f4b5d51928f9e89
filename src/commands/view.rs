// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! View command - interactive viewer and editor

use super::CommandContext;
use anyhow::Result;

/// Launch the interactive viewer
pub fn run(ctx: &CommandContext) -> Result<()> {
    tracing::info!("Launching TUI...");
    let mut session = ctx.open_session()?;
    crate::tui::run(&mut session, ctx.config.export_path())?;
    ctx.finish(&mut session)
}
