// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Whole-document persistence
//!
//! The document is the unit of load and save; stores never see partial
//! updates.

use crate::types::Document;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading or saving the document
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid JSON of the expected shape
    #[error("invalid papers document: {0}")]
    Parse(#[from] serde_json::Error),
    /// The papers endpoint could not be reached
    #[error("request to papers endpoint failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The papers endpoint answered with a non-success status
    #[error("papers endpoint returned {status} for {method} {url}")]
    Status {
        /// HTTP method
        method: &'static str,
        /// Endpoint URL
        url: String,
        /// Response status
        status: reqwest::StatusCode,
    },
    /// Saving was refused by an in-memory store
    #[error("save rejected: {0}")]
    Rejected(String),
}

/// Backing store for the papers document
pub trait DocumentStore {
    /// Load the whole document
    fn load(&self) -> Result<Document, StoreError>;

    /// Replace the whole document
    fn save(&self, document: &Document) -> Result<(), StoreError>;

    /// Human-readable location, for messages
    fn describe(&self) -> String;
}

// =============================================================================
// File store
// =============================================================================

/// Document kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Store backed by `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentStore for FileStore {
    fn load(&self) -> Result<Document, StoreError> {
        if !self.path.exists() {
            info!("No document at {}, starting empty", self.path.display());
            return Ok(Document::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        let document: Document = serde_json::from_str(&content)?;
        debug!("Loaded {} papers from {}", document.papers.len(), self.path.display());
        Ok(document)
    }

    fn save(&self, document: &Document) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!("Saved {} papers to {}", document.papers.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// =============================================================================
// HTTP store
// =============================================================================

/// Document served by a papers endpoint (GET to load, POST to save)
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpStore {
    /// Store talking to `url`
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            url: url.into(),
        }
    }
}

impl DocumentStore for HttpStore {
    fn load(&self) -> Result<Document, StoreError> {
        let response = self.client.get(&self.url).send()?;
        if !response.status().is_success() {
            return Err(StoreError::Status {
                method: "GET",
                url: self.url.clone(),
                status: response.status(),
            });
        }
        let document: Document = response.json()?;
        debug!("Loaded {} papers from {}", document.papers.len(), self.url);
        Ok(document)
    }

    fn save(&self, document: &Document) -> Result<(), StoreError> {
        let response = self.client.post(&self.url).json(document).send()?;
        if !response.status().is_success() {
            return Err(StoreError::Status {
                method: "POST",
                url: self.url.clone(),
                status: response.status(),
            });
        }
        debug!("Saved {} papers to {}", document.papers.len(), self.url);
        Ok(())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// =============================================================================
// Memory store
// =============================================================================

/// Document held in memory; used for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RefCell<Option<Document>>,
    saves: RefCell<usize>,
    fail_saves: bool,
}

impl MemoryStore {
    /// Store that loads `document`
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document: RefCell::new(Some(document)),
            ..Self::default()
        }
    }

    /// Store whose loads fail, as if the endpoint were unreachable
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Make every save fail
    #[must_use]
    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// Most recently saved (or initial) document
    #[must_use]
    pub fn snapshot(&self) -> Option<Document> {
        self.document.borrow().clone()
    }

    /// Number of successful saves
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<Document, StoreError> {
        self.document
            .borrow()
            .clone()
            .ok_or_else(|| StoreError::Rejected("no document in memory".into()))
    }

    fn save(&self, document: &Document) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Rejected("store is read-only".into()));
        }
        *self.document.borrow_mut() = Some(document.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn load(&self) -> Result<Document, StoreError> {
        (**self).load()
    }

    fn save(&self, document: &Document) -> Result<(), StoreError> {
        (**self).save(document)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn load(&self) -> Result<Document, StoreError> {
        (**self).load()
    }

    fn save(&self, document: &Document) -> Result<(), StoreError> {
        (**self).save(document)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
