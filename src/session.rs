// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Edit session over the papers document
//!
//! A session owns the in-memory document, the projected graph with live
//! canvas positions and the edit state. Every document mutation re-projects
//! the graph, lays it out again and saves the whole document. A failed save
//! is logged and leaves memory untouched; the session stays dirty until a
//! later save succeeds.

use crate::graph::PaperGraph;
use crate::layout::{Layout, LayoutConfig};
use crate::store::{DocumentStore, StoreError};
use crate::types::{Document, Paper, Position, Priority, ReadingStatus};
use chrono::{DateTime, Datelike, Utc};
use sha2::{Digest, Sha256};
use std::mem;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors raised by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// The document could not be loaded
    #[error("no papers document loaded")]
    NoData,
    /// No paper with this ID
    #[error("paper not found: {0}")]
    PaperNotFound(String),
    /// A save or cancel was requested outside of editing
    #[error("no paper is being edited")]
    NotEditing,
    /// A paper cannot be its own prerequisite
    #[error("paper cannot depend on itself: {0}")]
    SelfDependency(String),
    /// Export serialization failed
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The store refused the document
    #[error(transparent)]
    Store(#[from] StoreError),
}

// =============================================================================
// Edit form
// =============================================================================

/// Scratch copy of a paper's editable fields
///
/// Unset fields fall back to defaults when the form is saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaperForm {
    /// Title
    pub title: Option<String>,
    /// Authors
    pub authors: Option<String>,
    /// Publication year
    pub year: Option<i32>,
    /// Link
    pub url: Option<String>,
    /// Notes
    pub description: Option<String>,
    /// Venue
    pub venue: Option<String>,
    /// Topic
    pub topic_id: Option<String>,
    /// Tags
    pub tags: Option<Vec<String>>,
    /// Reading status
    pub status: Option<ReadingStatus>,
    /// Priority
    pub priority: Option<Priority>,
    /// Prerequisite IDs
    pub dependencies: Option<Vec<String>>,
    /// Creation time
    pub created_at: Option<DateTime<Utc>>,
}

impl PaperForm {
    /// Load a paper's fields into a form
    #[must_use]
    pub fn from_paper(paper: &Paper) -> Self {
        Self {
            title: Some(paper.title.clone()),
            authors: Some(paper.authors.clone()),
            year: Some(paper.year),
            url: paper.url.clone(),
            description: paper.description.clone(),
            venue: paper.venue.clone(),
            topic_id: paper.topic_id.clone(),
            tags: paper.tags.clone(),
            status: Some(paper.status),
            priority: Some(paper.priority),
            dependencies: Some(paper.dependencies.clone()),
            created_at: Some(paper.created_at),
        }
    }

    /// Build the saved paper, defaulting missing fields
    ///
    /// The position is reset to the origin so the paper gets laid out again.
    #[must_use]
    pub fn into_paper(self, id: &str, now: DateTime<Utc>) -> Paper {
        Paper {
            id: id.to_string(),
            title: self
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| Paper::UNTITLED.to_string()),
            authors: self.authors.unwrap_or_default(),
            year: self.year.filter(|y| *y != 0).unwrap_or_else(|| now.year()),
            url: self.url,
            description: self.description,
            status: self.status.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            dependencies: self.dependencies.unwrap_or_default(),
            topic_id: self.topic_id,
            dag_position: Some(Position::ORIGIN),
            tags: self.tags,
            venue: self.venue,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}

/// What the session is doing
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditState {
    /// Browsing the graph
    #[default]
    Viewing,
    /// Editing one paper through a scratch form
    Editing {
        /// Paper being edited
        paper_id: String,
        /// Scratch form
        form: PaperForm,
    },
}

/// Paper counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Stats {
    /// All papers
    pub total: usize,
    /// Not started
    pub to_read: usize,
    /// In progress
    pub reading: usize,
    /// Finished
    pub completed: usize,
    /// Put aside
    pub archived: usize,
}

// =============================================================================
// Session
// =============================================================================

/// Editing session bound to a document store
pub struct Session<S: DocumentStore> {
    store: S,
    document: Option<Document>,
    graph: PaperGraph,
    layout: Layout,
    layout_config: LayoutConfig,
    state: EditState,
    persisted_digest: Option<String>,
}

impl<S: DocumentStore> Session<S> {
    /// Load the document and lay it out
    ///
    /// A load failure is logged and leaves the session without data.
    pub fn open(store: S, layout_config: LayoutConfig) -> Self {
        let (document, persisted_digest) = match store.load() {
            Ok(document) => {
                let digest = digest(&document);
                (Some(document), Some(digest))
            }
            Err(e) => {
                error!("Failed to load papers from {}: {}", store.describe(), e);
                (None, None)
            }
        };

        let mut session = Self {
            store,
            document,
            graph: PaperGraph::new(),
            layout: Layout::default(),
            layout_config,
            state: EditState::Viewing,
            persisted_digest,
        };
        session.refresh_view();
        session
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The in-memory document, if one was loaded
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Whether a document was loaded
    #[must_use]
    pub fn has_data(&self) -> bool {
        self.document.is_some()
    }

    /// The projected graph with live positions
    #[must_use]
    pub fn graph(&self) -> &PaperGraph {
        &self.graph
    }

    /// The most recent automatic or manual layout
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Current layout configuration
    #[must_use]
    pub fn layout_config(&self) -> &LayoutConfig {
        &self.layout_config
    }

    /// Current edit state
    #[must_use]
    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// ID of the paper being edited
    #[must_use]
    pub fn editing_id(&self) -> Option<&str> {
        match &self.state {
            EditState::Editing { paper_id, .. } => Some(paper_id),
            EditState::Viewing => None,
        }
    }

    /// The scratch form of the paper being edited
    pub fn form_mut(&mut self) -> Option<&mut PaperForm> {
        match &mut self.state {
            EditState::Editing { form, .. } => Some(form),
            EditState::Viewing => None,
        }
    }

    /// The backing store
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether memory holds changes the store has not accepted
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.document
            .as_ref()
            .is_some_and(|doc| self.persisted_digest.as_deref() != Some(digest(doc).as_str()))
    }

    /// Paper counts by status
    #[must_use]
    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        for paper in self.document.iter().flat_map(|d| &d.papers) {
            stats.total += 1;
            match paper.status {
                ReadingStatus::ToRead => stats.to_read += 1,
                ReadingStatus::Reading => stats.reading += 1,
                ReadingStatus::Completed => stats.completed += 1,
                ReadingStatus::Archived => stats.archived += 1,
            }
        }
        stats
    }

    // -------------------------------------------------------------------------
    // Edit state machine
    // -------------------------------------------------------------------------

    /// Start editing a paper, loading its fields into the form
    pub fn begin_edit(&mut self, id: &str) -> Result<(), SessionError> {
        let document = self.document.as_ref().ok_or(SessionError::NoData)?;
        let paper = document
            .paper(id)
            .ok_or_else(|| SessionError::PaperNotFound(id.to_string()))?;
        self.state = EditState::Editing {
            paper_id: paper.id.clone(),
            form: PaperForm::from_paper(paper),
        };
        debug!("Editing {}", id);
        Ok(())
    }

    /// Write the form back into the document and return to viewing
    pub fn save_edit(&mut self) -> Result<String, SessionError> {
        let (paper_id, form) = match mem::take(&mut self.state) {
            EditState::Editing { paper_id, form } => (paper_id, form),
            EditState::Viewing => return Err(SessionError::NotEditing),
        };

        let document = self.document.as_mut().ok_or(SessionError::NoData)?;
        let paper = document
            .paper_mut(&paper_id)
            .ok_or_else(|| SessionError::PaperNotFound(paper_id.clone()))?;
        *paper = form.into_paper(&paper_id, Utc::now());

        info!("Saved edit of {}", paper_id);
        self.commit();
        Ok(paper_id)
    }

    /// Discard the form and return to viewing
    pub fn cancel_edit(&mut self) -> bool {
        let was_editing = matches!(self.state, EditState::Editing { .. });
        self.state = EditState::Viewing;
        was_editing
    }

    /// Append a paper with default values and start editing it
    pub fn add_paper(&mut self) -> Result<String, SessionError> {
        let document = self.document.as_mut().ok_or(SessionError::NoData)?;
        let now = Utc::now();
        let paper = Paper::new(document.unique_paper_id(now), now);
        let id = paper.id.clone();

        self.state = EditState::Editing {
            paper_id: id.clone(),
            form: PaperForm::from_paper(&paper),
        };
        document.papers.push(paper);

        info!("Added paper {}", id);
        self.commit();
        Ok(id)
    }

    /// Remove a paper; other papers keep any dependency on it
    pub fn delete_paper(&mut self, id: &str) -> Result<(), SessionError> {
        let document = self.document.as_mut().ok_or(SessionError::NoData)?;
        let before = document.papers.len();
        document.papers.retain(|p| p.id != id);
        if document.papers.len() == before {
            return Err(SessionError::PaperNotFound(id.to_string()));
        }

        self.graph.remove_node(id);
        if self.editing_id() == Some(id) {
            self.state = EditState::Viewing;
        }

        info!("Deleted paper {}", id);
        self.commit();
        Ok(())
    }

    /// Make `source` a prerequisite of `target`; returns false if it already was
    pub fn connect(&mut self, source: &str, target: &str) -> Result<bool, SessionError> {
        if source == target {
            return Err(SessionError::SelfDependency(source.to_string()));
        }
        let document = self.document.as_mut().ok_or(SessionError::NoData)?;
        if !document.contains(source) {
            return Err(SessionError::PaperNotFound(source.to_string()));
        }
        let paper = document
            .paper_mut(target)
            .ok_or_else(|| SessionError::PaperNotFound(target.to_string()))?;
        if paper.depends_on(source) {
            return Ok(false);
        }
        paper.dependencies.push(source.to_string());

        info!("Connected {} -> {}", source, target);
        self.commit();
        if self.graph.has_cycle() {
            warn!("Dependencies now contain a cycle through {} -> {}", source, target);
        }
        Ok(true)
    }

    /// Remove `source` from the prerequisites of `target`
    pub fn disconnect(&mut self, source: &str, target: &str) -> Result<bool, SessionError> {
        let document = self.document.as_mut().ok_or(SessionError::NoData)?;
        let paper = document
            .paper_mut(target)
            .ok_or_else(|| SessionError::PaperNotFound(target.to_string()))?;
        let before = paper.dependencies.len();
        paper.dependencies.retain(|d| d != source);
        if paper.dependencies.len() == before {
            return Ok(false);
        }

        info!("Disconnected {} -> {}", source, target);
        self.commit();
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Canvas
    // -------------------------------------------------------------------------

    /// Drag a node; the document is not touched until export
    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), SessionError> {
        if self.graph.move_node(id, position) {
            Ok(())
        } else {
            Err(SessionError::PaperNotFound(id.to_string()))
        }
    }

    /// Lay the graph out from scratch, discarding live positions
    pub fn relayout(&mut self) -> &Layout {
        self.layout = self.graph.layout(&self.layout_config);
        self.graph.apply_layout(&self.layout);
        &self.layout
    }

    /// Replace the layout configuration and lay out again
    pub fn set_layout_config(&mut self, config: LayoutConfig) -> &Layout {
        self.layout_config = config;
        self.relayout()
    }

    /// Push overlapping nodes apart; returns the number of moves
    pub fn fix_overlaps(&mut self) -> usize {
        self.graph.fix_overlaps(&self.layout_config)
    }

    // -------------------------------------------------------------------------
    // Export and persistence
    // -------------------------------------------------------------------------

    /// The document with every paper's position taken from the canvas
    pub fn export(&self) -> Result<Document, SessionError> {
        let mut document = self.document.clone().ok_or(SessionError::NoData)?;
        for paper in &mut document.papers {
            if let Some(node) = self.graph.node(&paper.id) {
                paper.dag_position = Some(node.position);
            }
        }
        Ok(document)
    }

    /// [`Session::export`] as pretty JSON
    pub fn export_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(&self.export()?)?)
    }

    /// Save now if the store is behind memory
    pub fn flush(&mut self) -> Result<(), SessionError> {
        if !self.is_dirty() {
            return Ok(());
        }
        let document = self.document.as_ref().ok_or(SessionError::NoData)?;
        self.store.save(document)?;
        self.persisted_digest = Some(digest(document));
        info!("Saved papers to {}", self.store.describe());
        Ok(())
    }

    /// Re-project, lay out and save after a mutation
    fn commit(&mut self) {
        self.refresh_view();
        let Some(document) = self.document.as_ref() else {
            return;
        };
        match self.store.save(document) {
            Ok(()) => {
                self.persisted_digest = Some(digest(document));
                debug!("Auto-saved to {}", self.store.describe());
            }
            Err(e) => {
                error!("Failed to save papers to {}: {}", self.store.describe(), e);
            }
        }
    }

    /// Rebuild the graph from the document and position its nodes
    fn refresh_view(&mut self) {
        self.graph = self
            .document
            .as_ref()
            .map(|d| PaperGraph::project(&d.papers))
            .unwrap_or_default();
        self.layout = self.graph.layout(&self.layout_config);

        if self.layout_config.respect_saved_positions && self.graph.has_valid_positions() {
            let unplaced: Vec<(String, Position)> = self
                .graph
                .nodes()
                .iter()
                .filter(|n| n.position.is_origin())
                .filter_map(|n| self.layout.position(&n.id).map(|p| (n.id.clone(), p)))
                .collect();
            for (id, position) in unplaced {
                self.graph.move_node(&id, position);
            }
            self.graph.fix_overlaps(&self.layout_config);
        } else {
            self.graph.apply_layout(&self.layout);
        }
    }
}

/// Content digest of a document
fn digest(document: &Document) -> String {
    let bytes = serde_json::to_vec(document).unwrap_or_default();
    hex::encode(Sha256::digest(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn fixture() -> Document {
        let then = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let mut a = Paper::new("a", then);
        a.title = "Sequence to Sequence Learning".into();
        a.authors = "Sutskever et al.".into();
        a.year = 2014;
        a.status = ReadingStatus::Completed;

        let mut b = Paper::new("b", then);
        b.title = "Attention Is All You Need".into();
        b.authors = "Vaswani et al.".into();
        b.year = 2017;
        b.url = Some("https://arxiv.org/abs/1706.03762".into());
        b.venue = Some("NeurIPS".into());
        b.tags = Some(vec!["transformers".into()]);
        b.priority = Priority::High;
        b.dependencies = vec!["a".into()];

        Document {
            papers: vec![a, b],
            ..Document::default()
        }
    }

    #[test]
    fn test_open_lays_out() {
        let store = MemoryStore::new(fixture());
        let session = Session::open(&store, LayoutConfig::default());

        assert!(session.has_data());
        assert!(!session.is_dirty());
        let a = session.graph().node("a").unwrap().position;
        let b = session.graph().node("b").unwrap().position;
        assert!(b.y > a.y);
    }

    #[test]
    fn test_load_failure_is_no_data() {
        let store = MemoryStore::unavailable();
        let mut session = Session::open(&store, LayoutConfig::default());

        assert!(!session.has_data());
        assert!(session.graph().is_empty());
        assert!(matches!(session.add_paper(), Err(SessionError::NoData)));
        assert!(matches!(session.export(), Err(SessionError::NoData)));
    }

    #[test]
    fn test_edit_title_only_preserves_other_fields() {
        let store = MemoryStore::new(fixture());
        let mut session = Session::open(&store, LayoutConfig::default());
        let before = session.document().unwrap().paper("b").unwrap().clone();

        session.begin_edit("b").unwrap();
        session.form_mut().unwrap().title = Some("Attention (revised)".into());
        session.save_edit().unwrap();

        let after = session.document().unwrap().paper("b").unwrap().clone();
        assert_eq!(after.title, "Attention (revised)");
        assert!(after.updated_at > before.updated_at);
        assert_eq!(
            Paper {
                title: before.title.clone(),
                updated_at: before.updated_at,
                dag_position: before.dag_position,
                ..after
            },
            before
        );
        assert_eq!(session.state(), &EditState::Viewing);
    }

    #[test]
    fn test_save_edit_resets_position_and_defaults() {
        let store = MemoryStore::new(fixture());
        let mut session = Session::open(&store, LayoutConfig::default());

        session.begin_edit("a").unwrap();
        let form = session.form_mut().unwrap();
        form.title = Some("   ".into());
        form.year = None;
        session.save_edit().unwrap();

        let saved = store.snapshot().unwrap();
        let paper = saved.paper("a").unwrap();
        assert_eq!(paper.title, Paper::UNTITLED);
        assert_eq!(paper.year, Utc::now().year());
        assert_eq!(paper.dag_position, Some(Position::ORIGIN));
    }

    #[test]
    fn test_save_without_edit() {
        let store = MemoryStore::new(fixture());
        let mut session = Session::open(&store, LayoutConfig::default());
        assert!(matches!(session.save_edit(), Err(SessionError::NotEditing)));
    }

    #[test]
    fn test_cancel_discards_form() {
        let store = MemoryStore::new(fixture());
        let mut session = Session::open(&store, LayoutConfig::default());

        session.begin_edit("a").unwrap();
        session.form_mut().unwrap().title = Some("changed".into());
        assert!(session.cancel_edit());

        assert_eq!(session.document().unwrap().paper("a").unwrap().title, "Sequence to Sequence Learning");
        assert_eq!(store.save_count(), 0);
        assert!(!session.cancel_edit());
    }

    #[test]
    fn test_add_paper_enters_editing() {
        let store = MemoryStore::new(fixture());
        let mut session = Session::open(&store, LayoutConfig::default());

        let id = session.add_paper().unwrap();

        assert_eq!(session.editing_id(), Some(id.as_str()));
        assert_eq!(session.graph().node_count(), 3);
        let paper = store.snapshot().unwrap().paper(&id).cloned().unwrap();
        assert_eq!(paper.title, Paper::NEW_TITLE);
        assert_eq!(paper.status, ReadingStatus::ToRead);
        assert_eq!(paper.priority, Priority::Medium);
    }

    #[test]
    fn test_delete_exits_edit_and_keeps_dangling_dependency() {
        let store = MemoryStore::new(fixture());
        let mut session = Session::open(&store, LayoutConfig::default());

        session.begin_edit("a").unwrap();
        session.delete_paper("a").unwrap();

        assert_eq!(session.state(), &EditState::Viewing);
        assert_eq!(session.graph().node_count(), 1);
        assert_eq!(session.graph().edge_count(), 0);
        let b = session.document().unwrap().paper("b").unwrap();
        assert_eq!(b.dependencies, vec!["a".to_string()]);
        assert!(matches!(
            session.delete_paper("a"),
            Err(SessionError::PaperNotFound(_))
        ));
    }

    #[test]
    fn test_delete_other_paper_keeps_editing() {
        let store = MemoryStore::new(fixture());
        let mut session = Session::open(&store, LayoutConfig::default());

        session.begin_edit("b").unwrap();
        session.delete_paper("a").unwrap();
        assert_eq!(session.editing_id(), Some("b"));
    }

    #[test]
    fn test_connect_and_disconnect() {
        let store = MemoryStore::new(fixture());
        let mut session = Session::open(&store, LayoutConfig::default());
        let id = session.add_paper().unwrap();
        session.cancel_edit();

        assert!(session.connect("b", &id).unwrap());
        assert!(!session.connect("b", &id).unwrap());
        assert!(session.graph().has_edge("b", &id));
        assert!(matches!(session.connect("a", "a"), Err(SessionError::SelfDependency(_))));
        assert!(matches!(session.connect("ghost", "a"), Err(SessionError::PaperNotFound(_))));

        assert!(session.disconnect("b", &id).unwrap());
        assert!(!session.disconnect("b", &id).unwrap());
        assert!(!session.graph().has_edge("b", &id));
    }

    #[test]
    fn test_every_mutation_saves() {
        let store = MemoryStore::new(fixture());
        let mut session = Session::open(&store, LayoutConfig::default());

        let id = session.add_paper().unwrap();
        session.save_edit().unwrap();
        session.connect("a", &id).unwrap();
        session.delete_paper(&id).unwrap();

        assert_eq!(store.save_count(), 4);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_save_failure_keeps_memory_and_stays_dirty() {
        let store = MemoryStore::new(fixture()).failing_saves();
        let mut session = Session::open(&store, LayoutConfig::default());

        session.delete_paper("a").unwrap();

        assert_eq!(session.document().unwrap().papers.len(), 1);
        assert!(session.is_dirty());
        assert!(matches!(session.flush(), Err(SessionError::Store(_))));
        assert_eq!(store.snapshot().unwrap().papers.len(), 2);
    }

    #[test]
    fn test_export_merges_live_positions() {
        let store = MemoryStore::new(fixture());
        let mut session = Session::open(&store, LayoutConfig::default());

        session.move_node("a", Position::new(12.0, 34.0)).unwrap();
        let exported = session.export().unwrap();

        assert_eq!(exported.paper("a").unwrap().dag_position, Some(Position::new(12.0, 34.0)));
        assert_eq!(
            exported.paper("b").unwrap().dag_position,
            Some(session.graph().node("b").unwrap().position)
        );
        // Dragging alone does not touch the document
        assert_eq!(session.document().unwrap().paper("a").unwrap().dag_position, Some(Position::ORIGIN));
        assert!(session.move_node("ghost", Position::ORIGIN).is_err());
    }

    #[test]
    fn test_relayout_restores_computed_positions() {
        let store = MemoryStore::new(fixture());
        let mut session = Session::open(&store, LayoutConfig::default());
        let computed = session.graph().node("a").unwrap().position;

        session.move_node("a", Position::new(999.0, 999.0)).unwrap();
        session.relayout();

        assert_eq!(session.graph().node("a").unwrap().position, computed);
    }

    #[test]
    fn test_respect_saved_positions() {
        let mut doc = fixture();
        doc.papers[0].dag_position = Some(Position::new(500.0, 40.0));
        let store = MemoryStore::new(doc);
        let config = LayoutConfig {
            respect_saved_positions: true,
            ..LayoutConfig::default()
        };
        let session = Session::open(&store, config);

        assert_eq!(session.graph().node("a").unwrap().position, Position::new(500.0, 40.0));
        assert!(!session.graph().node("b").unwrap().position.is_origin());
    }

    #[test]
    fn test_stats() {
        let store = MemoryStore::new(fixture());
        let session = Session::open(&store, LayoutConfig::default());
        let stats = session.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.to_read, 1);
    }
}
