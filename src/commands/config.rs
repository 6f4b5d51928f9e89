// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Config command - print the resolved configuration

use super::CommandContext;
use anyhow::Result;

/// Print the resolved configuration, or one dotted key of it
pub fn run(ctx: &CommandContext, key: Option<&str>) -> Result<()> {
    let Some(key) = key else {
        if ctx.json {
            println!("{}", serde_json::to_string_pretty(&ctx.config)?);
        } else {
            print!("{}", ctx.config.to_toml()?);
        }
        return Ok(());
    };

    match ctx.config.get(key)? {
        Some(toml::Value::String(s)) => println!("{}", s),
        Some(toml::Value::Table(table)) => print!("{}", toml::to_string_pretty(&table)?),
        Some(value) => println!("{}", value),
        None => anyhow::bail!("Unknown or unset configuration key: {}", key),
    }
    Ok(())
}
