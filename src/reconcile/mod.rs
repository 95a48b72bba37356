// src/reconcile/mod.rs

//! Drift detection and single-formula refresh
//!
//! `compare_all` checks every private formula against upstream and sorts
//! the results into a [`Report`]. Per-formula failures are recorded, never
//! raised. `refresh_one` pulls the upstream text for one formula, renames
//! its class into the private namespace and optionally writes it over the
//! private file. Nothing is committed or pushed.

use crate::error::{Error, Result};
use crate::formula::{FormulaEntry, FormulaTransformer};
use crate::naming::NameResolver;
use crate::upstream::{UpstreamSource, VersionLookup};
use crate::version::{is_behind_with, FallbackOrdering};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Default number of concurrent upstream lookups
pub const DEFAULT_JOBS: usize = 8;

/// A private formula that is strictly behind upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationRow {
    pub private_name: String,
    pub upstream_name: String,
    pub private_version: String,
    pub upstream_version: String,
    pub path: PathBuf,
}

/// Outcome of a full drift check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Sorted by private name
    pub behind: Vec<ReconciliationRow>,
    /// Private names with no upstream counterpart
    pub not_found: Vec<String>,
    /// `"<private> (<upstream>): <error>"`
    pub errors: Vec<String>,
    /// Number of formulae examined
    pub checked: usize,
    /// Private names that are level with or ahead of upstream
    pub up_to_date: Vec<String>,
}

impl Report {
    /// True when nothing is behind and nothing failed
    pub fn is_clean(&self) -> bool {
        self.behind.is_empty() && self.errors.is_empty()
    }

    fn sort(&mut self) {
        self.behind
            .sort_by(|a, b| a.private_name.cmp(&b.private_name));
        self.not_found.sort();
        self.errors.sort();
        self.up_to_date.sort();
    }
}

/// Classification of a single formula
enum Classified {
    Behind(ReconciliationRow),
    UpToDate(String),
    NotFound(String),
    Failed(String),
}

/// Destination for refreshed formula text
pub trait FormulaWriter {
    fn write(&self, path: &Path, text: &str) -> Result<()>;
}

/// Writes formulae straight to the filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWriter;

impl FormulaWriter for FsWriter {
    fn write(&self, path: &Path, text: &str) -> Result<()> {
        fs::write(path, text)
            .map_err(|e| Error::IoError(format!("Failed to write {}: {}", path.display(), e)))
    }
}

/// Result of refreshing one formula from upstream
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub private_name: String,
    pub upstream_name: String,
    pub source_url: String,
    /// Private file that is (or would be) overwritten
    pub path: PathBuf,
    /// Rewritten upstream text
    pub text: String,
    /// Class declaration the rewritten text should contain
    pub expected_line: String,
    pub class_line_found: bool,
    pub written: bool,
    /// Unified diff from the current file, if it could be read
    pub diff: Option<String>,
}

impl RefreshOutcome {
    /// First `n` lines of the rewritten text
    pub fn preview(&self, n: usize) -> impl Iterator<Item = &str> {
        self.text.lines().take(n)
    }

    /// True when the rewritten text matches the current file
    pub fn is_unchanged(&self) -> bool {
        self.diff.as_deref().is_some_and(|d| !d.contains("\n@@"))
    }
}

/// Compares a private tap with upstream
pub struct Reconciler<'a> {
    names: NameResolver,
    transformer: FormulaTransformer,
    upstream: &'a dyn UpstreamSource,
    fallback: FallbackOrdering,
    jobs: usize,
}

impl<'a> Reconciler<'a> {
    pub fn new(names: NameResolver, upstream: &'a dyn UpstreamSource) -> Self {
        Self {
            transformer: FormulaTransformer::new(names.clone()),
            names,
            upstream,
            fallback: FallbackOrdering::default(),
            jobs: DEFAULT_JOBS,
        }
    }

    /// Ordering used when a version does not parse
    pub fn with_fallback(mut self, fallback: FallbackOrdering) -> Self {
        self.fallback = fallback;
        self
    }

    /// Maximum number of concurrent lookups
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Check every entry against upstream
    ///
    /// Never fails: each entry ends up in exactly one of `behind`,
    /// `up_to_date`, `not_found` or `errors`.
    pub fn compare_all(&self, entries: &BTreeMap<String, FormulaEntry>) -> Report {
        let entries: Vec<&FormulaEntry> = entries.values().collect();
        info!(
            "Checking {} formulae against upstream ({} jobs)",
            entries.len(),
            self.jobs
        );

        let classified: Vec<Classified> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
        {
            Ok(pool) => pool.install(|| entries.par_iter().map(|e| self.classify(e)).collect()),
            Err(e) => {
                warn!("Failed to start worker pool ({}), checking sequentially", e);
                entries.iter().map(|e| self.classify(e)).collect()
            }
        };

        let mut report = Report {
            checked: entries.len(),
            ..Report::default()
        };
        for item in classified {
            match item {
                Classified::Behind(row) => report.behind.push(row),
                Classified::UpToDate(name) => report.up_to_date.push(name),
                Classified::NotFound(name) => report.not_found.push(name),
                Classified::Failed(msg) => report.errors.push(msg),
            }
        }
        report.sort();

        info!(
            "{} behind, {} up to date, {} not found, {} errors",
            report.behind.len(),
            report.up_to_date.len(),
            report.not_found.len(),
            report.errors.len()
        );
        report
    }

    fn classify(&self, entry: &FormulaEntry) -> Classified {
        let upstream_name = self.names.resolve(&entry.name);

        match self.upstream.fetch_version(&upstream_name) {
            Ok(VersionLookup::Found(upstream_version)) => {
                if is_behind_with(&entry.version, &upstream_version, self.fallback) {
                    debug!(
                        "{} {} is behind {} {}",
                        entry.name, entry.version, upstream_name, upstream_version
                    );
                    Classified::Behind(ReconciliationRow {
                        private_name: entry.name.clone(),
                        upstream_name,
                        private_version: entry.version.clone(),
                        upstream_version,
                        path: entry.path.clone(),
                    })
                } else {
                    Classified::UpToDate(entry.name.clone())
                }
            }
            Ok(VersionLookup::NotFound) => {
                debug!("{} ({}) not found upstream", entry.name, upstream_name);
                Classified::NotFound(entry.name.clone())
            }
            Err(e) => {
                if e.is_per_entry() {
                    warn!("{} ({}): {}", entry.name, upstream_name, e);
                } else {
                    error!("{} ({}): {}", entry.name, upstream_name, e);
                }
                Classified::Failed(format!("{} ({}): {}", entry.name, upstream_name, e))
            }
        }
    }

    /// Replace one private formula with the renamed upstream text
    ///
    /// With `apply` false nothing is written and the outcome is a preview.
    pub fn refresh_one(
        &self,
        private_name: &str,
        entry: &FormulaEntry,
        apply: bool,
        writer: &dyn FormulaWriter,
    ) -> Result<RefreshOutcome> {
        let upstream_name = self.names.resolve(private_name);
        let content = self.upstream.fetch_content(&upstream_name)?;
        info!("Fetched {} from {}", upstream_name, content.source_url);

        let rewrite = self.transformer.rewrite(&content.text, private_name);
        let expected_line = self.transformer.expected_line(private_name);
        let class_line_found = rewrite.text.contains(&expected_line);
        if !class_line_found {
            warn!(
                "Expected class line '{}' not found in rewritten {}",
                expected_line, upstream_name
            );
        }

        let diff = match fs::read_to_string(&entry.path) {
            Ok(current) => Some(diffy::create_patch(&current, &rewrite.text).to_string()),
            Err(e) => {
                debug!("No diff for {}: {}", entry.path.display(), e);
                None
            }
        };

        if apply {
            writer.write(&entry.path, &rewrite.text)?;
            info!("Wrote {}", entry.path.display());
        }

        Ok(RefreshOutcome {
            private_name: private_name.to_string(),
            upstream_name,
            source_url: content.source_url,
            path: entry.path.clone(),
            text: rewrite.text,
            expected_line,
            class_line_found,
            written: apply,
            diff,
        })
    }
}
