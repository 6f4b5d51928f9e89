// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Show command - details of one paper

use super::{resolve_in, CommandContext};
use anyhow::{Context, Result};
use serde_json::json;

/// Run the show command
pub fn run(ctx: &CommandContext, paper: &str) -> Result<()> {
    let session = ctx.open_session()?;
    let id = resolve_in(&session, paper)?;
    let graph = session.graph();
    let node = graph.node(&id).context("Paper is missing from the graph")?;
    let prerequisites = graph.prerequisites_of(&id);
    let dependents = graph.dependents_of(&id);

    if ctx.json {
        let value = json!({
            "paper": node.paper,
            "position": node.position,
            "prerequisites": prerequisites,
            "dependents": dependents,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let p = &node.paper;
    println!("{}", p.title);
    println!("  id:        {}", ctx.id_label(&p.id));
    if !p.authors.is_empty() {
        println!("  authors:   {}", p.authors);
    }
    println!("  year:      {}", p.year);
    if let Some(venue) = &p.venue {
        println!("  venue:     {}", venue);
    }
    if let Some(url) = &p.url {
        println!("  url:       {}", url);
    }
    println!("  status:    {}", ctx.status_label(p.status));
    println!("  priority:  {}", p.priority);
    if let Some(tags) = p.tags.as_ref().filter(|t| !t.is_empty()) {
        println!("  tags:      {}", tags.join(", "));
    }
    if let Some(description) = &p.description {
        println!("  notes:     {}", description);
    }

    // Dangling references are listed separately from drawn prerequisites
    let missing: Vec<&str> = p
        .dependencies
        .iter()
        .map(String::as_str)
        .filter(|d| graph.node(d).is_none())
        .collect();

    println!();
    println!("Prerequisites ({}):", prerequisites.len());
    for dep in &prerequisites {
        let title = graph.node(dep).map_or("", |n| n.paper.title.as_str());
        println!("  {} {}", ctx.id_label(dep), title);
    }
    for dep in missing {
        println!("  {} (missing)", dep);
    }
    println!("Needed by ({}):", dependents.len());
    for dep in &dependents {
        let title = graph.node(dep).map_or("", |n| n.paper.title.as_str());
        println!("  {} {}", ctx.id_label(dep), title);
    }
    Ok(())
}
