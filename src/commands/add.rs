// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Add command - create a paper

use super::{resolve_in, CliSession, CommandContext};
use crate::session::PaperForm;
use crate::types::{Priority, ReadingStatus};
use anyhow::{Context, Result};
use clap::Args;

/// Optional paper fields shared by `add` and `edit`
#[derive(Debug, Clone, Default, Args)]
pub struct PaperArgs {
    /// Author list
    #[arg(long)]
    pub authors: Option<String>,
    /// Publication year
    #[arg(long)]
    pub year: Option<i32>,
    /// Link to the paper
    #[arg(long)]
    pub url: Option<String>,
    /// Publication venue
    #[arg(long)]
    pub venue: Option<String>,
    /// Notes
    #[arg(long)]
    pub description: Option<String>,
    /// Reading status (to_read, reading, completed, archived)
    #[arg(long, value_parser = parse_status)]
    pub status: Option<ReadingStatus>,
    /// Priority (HIGH, MED, LOW)
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,
    /// Prerequisite paper (ID or title); repeat for several
    #[arg(long = "dep")]
    pub deps: Vec<String>,
    /// Tag; repeat for several
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

impl PaperArgs {
    /// Copy the given fields into a form
    ///
    /// Prerequisites and tags replace the existing lists when any are given.
    pub fn apply(&self, session: &CliSession, form: &mut PaperForm) -> Result<()> {
        if let Some(authors) = &self.authors {
            form.authors = Some(authors.clone());
        }
        if let Some(year) = self.year {
            form.year = Some(year);
        }
        if let Some(url) = &self.url {
            form.url = Some(url.clone()).filter(|u| !u.is_empty());
        }
        if let Some(venue) = &self.venue {
            form.venue = Some(venue.clone()).filter(|v| !v.is_empty());
        }
        if let Some(description) = &self.description {
            form.description = Some(description.clone()).filter(|d| !d.is_empty());
        }
        if let Some(status) = self.status {
            form.status = Some(status);
        }
        if let Some(priority) = self.priority {
            form.priority = Some(priority);
        }
        if !self.deps.is_empty() {
            let deps = self
                .deps
                .iter()
                .map(|d| resolve_in(session, d))
                .collect::<Result<Vec<_>>>()?;
            form.dependencies = Some(deps);
        }
        if !self.tags.is_empty() {
            form.tags = Some(self.tags.clone());
        }
        Ok(())
    }
}

/// Parse a reading status argument
pub fn parse_status(s: &str) -> Result<ReadingStatus, String> {
    ReadingStatus::parse(s)
        .ok_or_else(|| format!("unknown status '{s}' (to_read, reading, completed, archived)"))
}

/// Parse a priority argument
pub fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("unknown priority '{s}' (HIGH, MED, LOW)"))
}

/// Run the add command
pub fn run(ctx: &CommandContext, title: &str, fields: &PaperArgs) -> Result<()> {
    let mut session = ctx.open_session()?;

    // Resolve prerequisites before the new paper exists so it cannot match itself
    let mut form = PaperForm {
        title: Some(title.to_string()),
        ..PaperForm::default()
    };
    fields.apply(&session, &mut form)?;

    let id = session.add_paper()?;
    let editing = session.form_mut().context("New paper is not being edited")?;
    let created_at = editing.created_at;
    *editing = PaperForm {
        created_at,
        ..form
    };
    session.save_edit()?;
    ctx.finish(&mut session)?;

    if ctx.json {
        let paper = session.document().and_then(|d| d.paper(&id));
        println!("{}", serde_json::to_string_pretty(&paper)?);
    } else {
        println!("Added paper: {} ({})", title, ctx.id_label(&id));
    }
    Ok(())
}
