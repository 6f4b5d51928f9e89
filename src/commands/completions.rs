// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Completions command - shell completion scripts

use anyhow::Result;
use clap::Command;
use clap_complete::Shell;

/// Write a completion script for `shell` to stdout
pub fn run(shell: Shell, mut cmd: Command) -> Result<()> {
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}
