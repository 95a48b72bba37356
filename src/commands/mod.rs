// src/commands/mod.rs
//! Command handlers for the tapdrift CLI

mod check;
mod list;
mod update;

pub use check::cmd_check;
pub use list::cmd_list;
pub use update::cmd_update;

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tapdrift::{
    Config, Credentials, FormulaEntry, FormulaScanner, GitCli, MirrorState, RepoMirror,
};
use tracing::info;

/// Bring the local mirror up to date and return its path
///
/// Credentials and the tap URL are resolved before any network access.
/// With `no_sync` the existing mirror is used as is and must exist.
pub fn prepare_tap(config: &Config, no_sync: bool) -> Result<PathBuf> {
    let dest = config.cache_dir.clone();

    if no_sync {
        if MirrorState::detect(&dest)? == MirrorState::Absent {
            anyhow::bail!(
                "Mirror {} does not exist; run once without --no-sync",
                dest.display()
            );
        }
        info!("Using existing mirror {}", dest.display());
        return Ok(dest);
    }

    let credentials = Credentials::from_env(&config.env)?;
    let tap_url = config.tap_url_from_env()?;
    let git = GitCli::new(&credentials)?.with_timeout(config.git_timeout());

    let mirror = RepoMirror::from_config(git, config);
    let path = mirror
        .ensure(&dest, &tap_url)
        .with_context(|| format!("Failed to sync private tap into {}", dest.display()))?;
    Ok(path)
}

/// Scan the mirror for formulae
pub fn scan_tap(config: &Config, root: &Path) -> Result<BTreeMap<String, FormulaEntry>> {
    let scanner = FormulaScanner::from_config(config);
    let entries = scanner
        .scan(root)
        .with_context(|| format!("Failed to scan {}", scanner.formula_root(root).display()))?;
    info!("Found {} formulae with a version", entries.len());
    Ok(entries)
}
