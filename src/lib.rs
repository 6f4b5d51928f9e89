// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Papergraph library - reading-order graph for research papers
//!
//! This crate provides the paper document model, the dependency graph
//! projection, a layered layout engine and the edit/export session that
//! drives them.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod graph;
pub mod layout;
pub mod session;
pub mod store;
pub mod tui;

/// Core data types of the papers document
pub mod types {
    use chrono::{DateTime, Datelike, Utc};
    use serde::{Deserialize, Serialize};
    use std::fmt;

    // =========================================================================
    // Enumerations
    // =========================================================================

    /// Reading status of a paper
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ReadingStatus {
        /// Not started yet
        #[default]
        ToRead,
        /// Currently being read
        Reading,
        /// Finished
        Completed,
        /// Put aside
        Archived,
    }

    impl ReadingStatus {
        /// All statuses in display order
        pub const ALL: [Self; 4] = [Self::ToRead, Self::Reading, Self::Completed, Self::Archived];

        /// Wire code for this status
        #[must_use]
        pub fn code(&self) -> &'static str {
            match self {
                Self::ToRead => "to_read",
                Self::Reading => "reading",
                Self::Completed => "completed",
                Self::Archived => "archived",
            }
        }

        /// Parse a status from its wire code or a loose alias
        #[must_use]
        pub fn parse(s: &str) -> Option<Self> {
            match s.to_lowercase().replace('-', "_").as_str() {
                "to_read" | "unread" | "todo" => Some(Self::ToRead),
                "reading" | "in_progress" => Some(Self::Reading),
                "completed" | "done" => Some(Self::Completed),
                "archived" => Some(Self::Archived),
                _ => None,
            }
        }

        /// The status after this one, wrapping around
        #[must_use]
        pub fn next(self) -> Self {
            match self {
                Self::ToRead => Self::Reading,
                Self::Reading => Self::Completed,
                Self::Completed => Self::Archived,
                Self::Archived => Self::ToRead,
            }
        }
    }

    impl fmt::Display for ReadingStatus {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.code())
        }
    }

    /// Reading priority
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub enum Priority {
        /// Read soon
        #[serde(rename = "HIGH")]
        High,
        /// Default priority
        #[default]
        #[serde(rename = "MED")]
        Medium,
        /// Whenever there is time
        #[serde(rename = "LOW")]
        Low,
    }

    impl Priority {
        /// Wire code for this priority
        #[must_use]
        pub fn code(&self) -> &'static str {
            match self {
                Self::High => "HIGH",
                Self::Medium => "MED",
                Self::Low => "LOW",
            }
        }

        /// Parse a priority from its wire code or a loose alias
        #[must_use]
        pub fn parse(s: &str) -> Option<Self> {
            match s.to_lowercase().as_str() {
                "high" | "h" => Some(Self::High),
                "med" | "medium" | "m" => Some(Self::Medium),
                "low" | "l" => Some(Self::Low),
                _ => None,
            }
        }

        /// The priority after this one, wrapping around
        #[must_use]
        pub fn next(self) -> Self {
            match self {
                Self::High => Self::Medium,
                Self::Medium => Self::Low,
                Self::Low => Self::High,
            }
        }
    }

    impl fmt::Display for Priority {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.code())
        }
    }

    // =========================================================================
    // Canvas
    // =========================================================================

    /// Position in 2D canvas space (top-left anchor)
    #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
    pub struct Position {
        /// X coordinate
        pub x: f64,
        /// Y coordinate
        pub y: f64,
    }

    impl Position {
        /// The canvas origin, used as "not yet placed"
        pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

        /// Create a position
        #[must_use]
        pub fn new(x: f64, y: f64) -> Self {
            Self { x, y }
        }

        /// Whether this is the origin
        #[must_use]
        #[allow(clippy::float_cmp)]
        pub fn is_origin(&self) -> bool {
            self.x == 0.0 && self.y == 0.0
        }
    }

    // =========================================================================
    // Paper
    // =========================================================================

    /// A research paper and its reading prerequisites
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Paper {
        /// Unique, stable identifier
        pub id: String,
        /// Title
        #[serde(default)]
        pub title: String,
        /// Author list as free text
        #[serde(default)]
        pub authors: String,
        /// Publication year
        #[serde(default = "current_year")]
        pub year: i32,
        /// Link to the paper
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub url: Option<String>,
        /// Notes
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        /// Reading status
        #[serde(default)]
        pub status: ReadingStatus,
        /// Reading priority
        #[serde(default)]
        pub priority: Priority,
        /// IDs of papers that should be read first
        #[serde(default)]
        pub dependencies: Vec<String>,
        /// Owning topic
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub topic_id: Option<String>,
        /// Last known canvas position
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub dag_position: Option<Position>,
        /// Free-form tags
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub tags: Option<Vec<String>>,
        /// Publication venue
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub venue: Option<String>,
        /// When the record was created
        #[serde(default = "Utc::now")]
        pub created_at: DateTime<Utc>,
        /// When the record was last changed
        #[serde(default = "Utc::now")]
        pub updated_at: DateTime<Utc>,
    }

    impl Paper {
        /// Title used when a paper is saved without one
        pub const UNTITLED: &'static str = "Untitled";

        /// Title given to freshly added papers
        pub const NEW_TITLE: &'static str = "New Paper";

        /// Build a paper with default field values
        #[must_use]
        pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
            Self {
                id: id.into(),
                title: Self::NEW_TITLE.into(),
                authors: String::new(),
                year: now.year(),
                url: None,
                description: None,
                status: ReadingStatus::ToRead,
                priority: Priority::Medium,
                dependencies: Vec::new(),
                topic_id: None,
                dag_position: Some(Position::ORIGIN),
                tags: None,
                venue: None,
                created_at: now,
                updated_at: now,
            }
        }

        /// Generate an ID for a new paper from a timestamp
        #[must_use]
        pub fn generate_id(now: DateTime<Utc>) -> String {
            format!("paper-{}", now.timestamp_millis())
        }

        /// Whether this paper lists `id` as a prerequisite
        #[must_use]
        pub fn depends_on(&self, id: &str) -> bool {
            self.dependencies.iter().any(|d| d == id)
        }
    }

    fn current_year() -> i32 {
        Utc::now().year()
    }

    // =========================================================================
    // Topic
    // =========================================================================

    /// A topic grouping papers (tree via `parent_id`)
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Topic {
        /// Unique identifier
        pub id: String,
        /// Display name
        pub name: String,
        /// Display color (CSS-style)
        #[serde(default)]
        pub color: String,
        /// Parent topic
        #[serde(default)]
        pub parent_id: Option<String>,
        /// When the record was created
        #[serde(default = "Utc::now")]
        pub created_at: DateTime<Utc>,
        /// When the record was last changed
        #[serde(default = "Utc::now")]
        pub updated_at: DateTime<Utc>,
    }

    /// Navigation state of the viewer
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct NavigationState {
        /// Currently selected topic
        #[serde(default)]
        pub current_topic_id: Option<String>,
        /// Expanded topics
        #[serde(default)]
        pub expanded_topic_ids: Vec<String>,
    }

    // =========================================================================
    // Document
    // =========================================================================

    /// The whole persisted state, loaded and saved as one unit
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    pub struct Document {
        /// All papers, in insertion order
        #[serde(default)]
        pub papers: Vec<Paper>,
        /// All topics
        #[serde(default)]
        pub topics: Vec<Topic>,
        /// Navigation state
        #[serde(default)]
        pub navigation: NavigationState,
    }

    impl Document {
        /// Get a paper by ID
        #[must_use]
        pub fn paper(&self, id: &str) -> Option<&Paper> {
            self.papers.iter().find(|p| p.id == id)
        }

        /// Get a mutable paper by ID
        pub fn paper_mut(&mut self, id: &str) -> Option<&mut Paper> {
            self.papers.iter_mut().find(|p| p.id == id)
        }

        /// Whether a paper with this ID exists
        #[must_use]
        pub fn contains(&self, id: &str) -> bool {
            self.papers.iter().any(|p| p.id == id)
        }

        /// Allocate a paper ID not yet used in this document
        #[must_use]
        pub fn unique_paper_id(&self, now: DateTime<Utc>) -> String {
            let base = Paper::generate_id(now);
            if !self.contains(&base) {
                return base;
            }
            let mut n = 1;
            loop {
                let candidate = format!("{base}-{n}");
                if !self.contains(&candidate) {
                    return candidate;
                }
                n += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::types::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_paper_wire_format() {
        let json = r#"{
            "id": "attention",
            "title": "Attention Is All You Need",
            "authors": "Vaswani et al.",
            "year": 2017,
            "status": "reading",
            "priority": "HIGH",
            "dependencies": ["seq2seq"],
            "dagPosition": {"x": 10.0, "y": 20.0},
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-02T00:00:00Z"
        }"#;

        let paper: Paper = serde_json::from_str(json).unwrap();
        assert_eq!(paper.status, ReadingStatus::Reading);
        assert_eq!(paper.priority, Priority::High);
        assert_eq!(paper.dag_position, Some(Position::new(10.0, 20.0)));

        let back = serde_json::to_value(&paper).unwrap();
        assert_eq!(back["dagPosition"]["x"], 10.0);
        assert_eq!(back["priority"], "HIGH");
        assert!(back.get("url").is_none());
    }

    #[test]
    fn test_partial_document_loads() {
        let doc: Document = serde_json::from_str(r#"{"papers": [{"id": "a"}]}"#).unwrap();
        assert_eq!(doc.papers.len(), 1);
        assert!(doc.papers[0].dependencies.is_empty());
        assert_eq!(doc.papers[0].status, ReadingStatus::ToRead);
        assert!(doc.topics.is_empty());
    }

    #[test]
    fn test_unique_paper_id() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut doc = Document::default();
        let first = doc.unique_paper_id(now);
        doc.papers.push(Paper::new(first.clone(), now));
        let second = doc.unique_paper_id(now);

        assert_eq!(first, Paper::generate_id(now));
        assert_eq!(second, format!("{first}-1"));
    }

    #[test]
    fn test_status_aliases() {
        assert_eq!(ReadingStatus::parse("in-progress"), Some(ReadingStatus::Reading));
        assert_eq!(ReadingStatus::parse("unread"), Some(ReadingStatus::ToRead));
        assert_eq!(Priority::parse("medium"), Some(Priority::Medium));
        assert_eq!(ReadingStatus::parse("nope"), None);
    }
}
