// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod add;
pub mod completions;
pub mod config;
pub mod connect;
pub mod delete;
pub mod edit;
pub mod export;
pub mod layout;
pub mod list;
pub mod order;
pub mod show;
pub mod stats;
pub mod view;

use crate::config::Config;
use crate::session::Session;
use crate::store::{DocumentStore, FileStore, HttpStore, MemoryStore};
use crate::types::{Document, ReadingStatus};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use tracing::info;

/// Session type used by the commands
pub type CliSession = Session<Box<dyn DocumentStore>>;

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Resolved configuration
    pub config: Config,
    /// Print JSON instead of text
    pub json: bool,
    /// Colour terminal output
    pub color: bool,
    /// Keep changes in memory only
    pub dry_run: bool,
}

impl CommandContext {
    /// Store selected by the configuration
    pub fn store(&self) -> Result<Box<dyn DocumentStore>> {
        let store: Box<dyn DocumentStore> = match &self.config.endpoint {
            Some(url) => Box::new(HttpStore::new(url.clone())),
            None => Box::new(FileStore::new(self.config.document_path())),
        };
        if !self.dry_run {
            return Ok(store);
        }

        let document = store
            .load()
            .with_context(|| format!("Failed to load papers from {}", store.describe()))?;
        info!("Dry run: changes to {} will not be saved", store.describe());
        Ok(Box::new(MemoryStore::new(document)))
    }

    /// Open a session, failing if the document cannot be loaded
    pub fn open_session(&self) -> Result<CliSession> {
        let store = self.store()?;
        let location = store.describe();
        let session = Session::open(store, self.config.layout.clone());
        if !session.has_data() {
            anyhow::bail!("Failed to load papers from {}", location);
        }
        Ok(session)
    }

    /// Make sure every change reached the store
    pub fn finish(&self, session: &mut CliSession) -> Result<()> {
        session.flush().with_context(|| {
            format!("Changes could not be saved to {}", session.store().describe())
        })
    }

    /// Status label, coloured when enabled
    #[must_use]
    pub fn status_label(&self, status: ReadingStatus) -> String {
        let label = status.to_string();
        if !self.color {
            return label;
        }
        match status {
            ReadingStatus::ToRead => label.blue().to_string(),
            ReadingStatus::Reading => label.yellow().to_string(),
            ReadingStatus::Completed => label.green().to_string(),
            ReadingStatus::Archived => label.dimmed().to_string(),
        }
    }

    /// Paper ID, coloured when enabled
    #[must_use]
    pub fn id_label(&self, id: &str) -> String {
        if self.color {
            id.cyan().to_string()
        } else {
            id.to_string()
        }
    }
}

/// Resolve a paper by exact ID or a unique case-insensitive title fragment
pub fn resolve_paper_id(document: &Document, query: &str) -> Result<String> {
    if document.contains(query) {
        return Ok(query.to_string());
    }

    let needle = query.to_lowercase();
    let matches: Vec<_> = document
        .papers
        .iter()
        .filter(|p| p.title.to_lowercase().contains(&needle))
        .collect();

    match matches.len() {
        0 => anyhow::bail!("No paper found matching: {}", query),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple papers match '{}':", query);
            for p in &matches {
                eprintln!("  {} ({})", p.title, p.id);
            }
            anyhow::bail!("Ambiguous paper title. Use the ID.");
        }
    }
}

/// Resolve a paper against a session's document
pub fn resolve_in(session: &CliSession, query: &str) -> Result<String> {
    let document = session.document().context("No papers document loaded")?;
    resolve_paper_id(document, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Paper;
    use chrono::Utc;

    fn document() -> Document {
        let mut a = Paper::new("p1", Utc::now());
        a.title = "Attention Is All You Need".into();
        let mut b = Paper::new("p2", Utc::now());
        b.title = "Attention in Graph Networks".into();
        Document {
            papers: vec![a, b],
            ..Document::default()
        }
    }

    #[test]
    fn test_resolve_by_id() {
        assert_eq!(resolve_paper_id(&document(), "p2").unwrap(), "p2");
    }

    #[test]
    fn test_resolve_by_title_fragment() {
        assert_eq!(resolve_paper_id(&document(), "all you NEED").unwrap(), "p1");
    }

    #[test]
    fn test_resolve_ambiguous_or_missing() {
        assert!(resolve_paper_id(&document(), "attention").is_err());
        assert!(resolve_paper_id(&document(), "transformer").is_err());
    }
}
