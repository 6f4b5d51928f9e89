// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Papergraph CLI - reading-order graph for research papers

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use papergraph::commands::{self, add::PaperArgs, export::ExportFormat, CommandContext};
use papergraph::config::{self, Config};
use papergraph::layout::Direction;
use papergraph::types::ReadingStatus;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "papergraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "PAPERGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory override
    #[arg(long, env = "PAPERGRAPH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Papers endpoint (load and save over HTTP instead of a file)
    #[arg(long, env = "PAPERGRAPH_ENDPOINT")]
    endpoint: Option<String>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    no_color: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Apply changes in memory only
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List papers in layout order
    List {
        /// Only papers with this status
        #[arg(long, value_parser = commands::add::parse_status)]
        status: Option<ReadingStatus>,
    },

    /// Show one paper with its prerequisites and dependents
    Show {
        /// Paper ID or title fragment
        paper: String,
    },

    /// Add a paper
    Add {
        /// Title
        #[arg(long)]
        title: String,

        #[command(flatten)]
        fields: PaperArgs,
    },

    /// Edit fields of a paper
    Edit {
        /// Paper ID or title fragment
        paper: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        fields: PaperArgs,
    },

    /// Delete a paper
    Delete {
        /// Paper ID or title fragment
        paper: String,
    },

    /// Make one paper a prerequisite of another
    Connect {
        /// Paper to read first
        prerequisite: String,
        /// Paper that depends on it
        dependent: String,
    },

    /// Remove a prerequisite
    Disconnect {
        /// Paper read first
        prerequisite: String,
        /// Paper that depends on it
        dependent: String,
    },

    /// Compute and print canvas positions
    Layout {
        /// Rank direction (TB, BT, LR, RL)
        #[arg(short, long, value_enum)]
        direction: Option<Direction>,

        /// Run the overlap correction pass afterwards
        #[arg(long)]
        fix_overlaps: bool,
    },

    /// Print a reading order that respects prerequisites
    Order,

    /// Export the document with canvas positions, or DOT
    Export {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Paper counts by status
    Stats,

    /// Launch interactive TUI
    View,

    /// Print the resolved configuration
    Config {
        /// Dotted key, e.g. layout.direction
        key: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = Some(endpoint.clone());
    }

    init_logging(&cli, &config)?;

    let ctx = CommandContext {
        config,
        json: cli.json,
        color: !cli.no_color,
        dry_run: cli.dry_run,
    };

    // Execute command
    match cli.command {
        Commands::List { status } => commands::list::run(&ctx, status),
        Commands::Show { paper } => commands::show::run(&ctx, &paper),
        Commands::Add { title, fields } => commands::add::run(&ctx, &title, &fields),
        Commands::Edit { paper, title, fields } => commands::edit::run(&ctx, &paper, title, &fields),
        Commands::Delete { paper } => commands::delete::run(&ctx, &paper),
        Commands::Connect { prerequisite, dependent } => {
            commands::connect::connect(&ctx, &prerequisite, &dependent)
        }
        Commands::Disconnect { prerequisite, dependent } => {
            commands::connect::disconnect(&ctx, &prerequisite, &dependent)
        }
        Commands::Layout { direction, fix_overlaps } => {
            commands::layout::run(&ctx, direction, fix_overlaps)
        }
        Commands::Order => commands::order::run(&ctx),
        Commands::Export { format, output } => commands::export::run(&ctx, format, output),
        Commands::Stats => commands::stats::run(&ctx),
        Commands::View => commands::view::run(&ctx),
        Commands::Config { key } => commands::config::run(&ctx, key.as_deref()),
        Commands::Completions { shell } => commands::completions::run(shell, Cli::command()),
    }
}

/// Logs go to stderr, or to a file while the viewer owns the terminal
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let level = match cli.verbose {
        0 if cli.quiet => "error",
        0 => config.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if matches!(cli.command, Commands::View) {
        fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;
        let path = config.log_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}
