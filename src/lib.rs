// src/lib.rs

//! tapdrift
//!
//! Detects version drift between a private Homebrew-style tap and the
//! public upstream catalog, and refreshes single formulae from upstream.
//!
//! # Architecture
//!
//! - Mirror: shallow local copy of the private tap, git is the only state
//! - Scanner: best-effort version extraction from formula text
//! - Upstream: registry API first, raw formula text as fallback
//! - Reconciler: bulk comparison into a report, plus single-formula refresh
//!
//! The tap is never committed to or pushed; refreshed files are only
//! written into the local mirror.

pub mod config;
mod error;
pub mod formula;
pub mod mirror;
pub mod naming;
pub mod reconcile;
pub mod upstream;
pub mod version;

pub use config::{Config, Credentials};
pub use error::{Error, Result};
pub use formula::{FormulaEntry, FormulaScanner, FormulaTransformer, Rewrite};
pub use mirror::{GitCli, GitTransport, MirrorState, PullOutcome, RepoMirror};
pub use naming::NameResolver;
pub use reconcile::{
    FormulaWriter, FsWriter, Reconciler, ReconciliationRow, RefreshOutcome, Report,
};
pub use upstream::{RegistryClient, UpstreamContent, UpstreamSource, VersionLookup};
pub use version::{is_behind, FallbackOrdering, VersionToken};
