// src/commands/list.rs
//! Formula listing

use super::{prepare_tap, scan_tap};
use anyhow::Result;
use tapdrift::Config;

/// Print every formula with a known version
pub fn cmd_list(config: &Config, limit: Option<usize>, no_sync: bool) -> Result<()> {
    let root = prepare_tap(config, no_sync)?;
    let entries = scan_tap(config, &root)?;

    let width = entries.keys().map(String::len).max().unwrap_or(0);
    for entry in entries.values().take(limit.unwrap_or(usize::MAX)) {
        println!("{:<width$}  {}", entry.name, entry.version);
    }

    println!("Total formulae: {}", entries.len());
    Ok(())
}
