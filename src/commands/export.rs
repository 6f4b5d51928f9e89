// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Export command - write the document with live positions, or DOT

use super::CommandContext;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    /// Papers document with canvas positions
    #[default]
    Json,
    /// Graphviz DOT format
    Dot,
}

impl ExportFormat {
    /// Get file extension for format
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Dot => "dot",
        }
    }
}

/// Run the export command
pub fn run(ctx: &CommandContext, format: ExportFormat, output: Option<PathBuf>) -> Result<()> {
    info!("Exporting to {}", format.extension());

    let session = ctx.open_session()?;
    if session.graph().is_empty() {
        eprintln!("Warning: no papers. Add one with 'papergraph add'.");
    }

    let content = match format {
        ExportFormat::Json => session.export_json()?,
        ExportFormat::Dot => session.graph().to_dot(session.layout_config().direction),
    };

    match output {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }

    Ok(())
}
