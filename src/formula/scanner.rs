// src/formula/scanner.rs

//! Formula directory scanning

use super::FormulaEntry;
use super::url::infer_version_from_url;
use crate::config::Config;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};
use walkdir::WalkDir;

static VERSION_LINE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r#"(?m)^\s*version(?:\s*\(\s*)?\s*["']([^"']+)["']"#).unwrap()
});

static URL_LINE_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r#"(?m)^\s*url\s+["']([^"']+)["']"#).unwrap());

/// Extract a formula's version from its text
///
/// An explicit `version "..."` line wins; otherwise the version is inferred
/// from the first `url "..."` line. Returns `None` when neither yields one.
pub fn extract_version(content: &str, name: &str) -> Option<String> {
    let declared = VERSION_LINE_RE
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
        .filter(|v| !v.is_empty());

    declared.or_else(|| {
        URL_LINE_RE
            .captures(content)
            .and_then(|caps| infer_version_from_url(&caps[1], name))
    })
}

/// Walks a tap's formula directory and collects versions
#[derive(Debug, Clone)]
pub struct FormulaScanner {
    formula_dir: String,
    extension: String,
}

impl Default for FormulaScanner {
    fn default() -> Self {
        Self::new("Formula", "rb")
    }
}

impl FormulaScanner {
    pub fn new(formula_dir: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            formula_dir: formula_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.formula_dir.clone(), config.formula_extension.clone())
    }

    /// Directory that `scan` walks for a given tap root
    pub fn formula_root(&self, root: &Path) -> PathBuf {
        root.join(&self.formula_dir)
    }

    /// Scan every formula under `<root>/<formula_dir>`
    ///
    /// Files without a recoverable version are skipped. Any traversal or
    /// read error aborts the whole scan; no partial result is returned.
    pub fn scan(&self, root: &Path) -> Result<BTreeMap<String, FormulaEntry>> {
        let formula_root = self.formula_root(root);
        let suffix = format!(".{}", self.extension);
        let mut entries = BTreeMap::new();
        let mut skipped = 0usize;

        for entry in WalkDir::new(&formula_root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                Error::IoError(format!(
                    "Failed to walk {}: {}",
                    formula_root.display(),
                    e
                ))
            })?;

            if entry.file_type().is_dir() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            let Some(name) = file_name.strip_suffix(suffix.as_str()) else {
                continue;
            };

            let path = entry.path();
            let content = std::fs::read_to_string(path).map_err(|e| {
                Error::IoError(format!("Failed to read formula {}: {}", path.display(), e))
            })?;

            match extract_version(&content, name) {
                Some(version) => {
                    debug!("{} {}", name, version);
                    entries.insert(
                        name.to_string(),
                        FormulaEntry {
                            name: name.to_string(),
                            version,
                            path: path.to_path_buf(),
                        },
                    );
                }
                None => {
                    debug!("No version found in {}", path.display());
                    skipped += 1;
                }
            }
        }

        info!(
            "Scanned {}: {} formulae with versions, {} without",
            formula_root.display(),
            entries.len(),
            skipped
        );
        Ok(entries)
    }
}
