// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Edit command - change fields of a paper

use super::add::PaperArgs;
use super::{resolve_in, CommandContext};
use anyhow::{Context, Result};

/// Run the edit command
pub fn run(ctx: &CommandContext, paper: &str, title: Option<String>, fields: &PaperArgs) -> Result<()> {
    let mut session = ctx.open_session()?;
    let id = resolve_in(&session, paper)?;

    session.begin_edit(&id)?;
    let mut form = session.form_mut().context("Paper is not being edited")?.clone();
    if let Some(title) = title {
        form.title = Some(title);
    }
    fields.apply(&session, &mut form)?;
    *session.form_mut().context("Paper is not being edited")? = form;
    session.save_edit()?;
    ctx.finish(&mut session)?;

    if ctx.json {
        let paper = session.document().and_then(|d| d.paper(&id));
        println!("{}", serde_json::to_string_pretty(&paper)?);
    } else {
        println!("Updated paper: {}", ctx.id_label(&id));
    }
    Ok(())
}
