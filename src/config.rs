// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration management
//!
//! Settings are layered: built-in defaults, then a TOML file, then
//! `PAPERGRAPH_*` environment variables (`__` separates nested keys, e.g.
//! `PAPERGRAPH_LAYOUT__DIRECTION=LR`).

use crate::layout::LayoutConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the papers document and log file
    pub data_dir: PathBuf,
    /// Document file name inside `data_dir`
    pub document_file: String,
    /// Papers endpoint; when set, the document is loaded and saved over HTTP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// File written by the viewer's export action, relative to `data_dir`
    pub export_file: String,
    /// Layout engine settings
    pub layout: LayoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: project_dirs()
                .map(|d| d.data_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".papergraph")),
            document_file: "papers.json".to_string(),
            endpoint: None,
            log_level: "info".to_string(),
            export_file: "papers.export.json".to_string(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Config {
    /// Path of the papers document
    #[must_use]
    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(&self.document_file)
    }

    /// Path of the viewer's export file
    #[must_use]
    pub fn export_path(&self) -> PathBuf {
        self.data_dir.join(&self.export_file)
    }

    /// Log file used while the viewer owns the terminal
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("papergraph.log")
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Look up a dotted key such as `layout.direction`
    pub fn get(&self, key: &str) -> Result<Option<toml::Value>> {
        let mut value = toml::Value::try_from(self).context("Failed to serialize configuration")?;
        for part in key.split('.') {
            value = match value {
                toml::Value::Table(mut table) => match table.remove(part) {
                    Some(v) => v,
                    None => return Ok(None),
                },
                _ => return Ok(None),
            };
        }
        Ok(Some(value))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "hyperpolymath", "papergraph")
}

/// Default location of the configuration file
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join("config.toml"))
}

/// Load configuration
///
/// An explicit `path` must exist; the default location is optional.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let defaults = ::config::Config::try_from(&Config::default())
        .context("Failed to build default configuration")?;
    let mut builder = ::config::Config::builder().add_source(defaults);

    match path {
        Some(path) => {
            debug!("Using config file {}", path.display());
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        None => {
            if let Some(path) = default_config_path() {
                builder = builder.add_source(::config::File::from(path).required(false));
            }
        }
    }

    builder
        .add_source(
            ::config::Environment::with_prefix("PAPERGRAPH")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Direction;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.document_file, "papers.json");
        assert_eq!(config.export_file, "papers.export.json");
        assert!(config.document_path().ends_with("papers.json"));
        assert_eq!(config.layout, LayoutConfig::default());
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/tmp/papers\"\nendpoint = \"http://localhost:3000/api/papers\"\n\n[layout]\ndirection = \"LR\"\nnode_width = 300.0\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/papers"));
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:3000/api/papers"));
        assert_eq!(config.layout.direction, Direction::LeftToRight);
        assert!((config.layout.node_width - 300.0).abs() < f64::EPSILON);
        assert!((config.layout.node_height - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        assert!(load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_get_dotted_key() {
        let config = Config::default();
        assert_eq!(
            config.get("layout.direction").unwrap(),
            Some(toml::Value::String("TB".into()))
        );
        assert_eq!(config.get("layout.nope").unwrap(), None);
        assert_eq!(config.get("endpoint").unwrap(), None);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let parsed: Config = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
