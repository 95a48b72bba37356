// src/formula/mod.rs

//! Formula definition files
//!
//! Only the lines tapdrift needs are read: `version`, `url` and the class
//! declaration. Everything else in a formula passes through untouched.

mod scanner;
mod transform;
mod url;

pub use scanner::{extract_version, FormulaScanner};
pub use transform::{declaration_line, replace_class_line, FormulaTransformer, Rewrite};
pub use url::{infer_version_from_url, strip_archive_extension};

use serde::Serialize;
use std::path::PathBuf;

/// A formula found in the private tap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaEntry {
    /// File stem, e.g. "gov-abseil"
    pub name: String,
    /// Best-effort extracted version, never empty
    pub version: String,
    /// File to overwrite on refresh
    pub path: PathBuf,
}
