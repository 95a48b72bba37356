// src/upstream/mod.rs

//! Authoritative upstream formula information
//!
//! The registry API is the primary source of versions. Formulae that live
//! in third-party taps are looked up in the alternate-source table and
//! their raw text is scanned the same way the private tap is.

mod client;

pub use client::RegistryClient;

use crate::error::Result;
use serde::Serialize;

/// Outcome of an upstream version lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum VersionLookup {
    /// Stable upstream version
    Found(String),
    /// Upstream does not know the formula, or has no stable release
    NotFound,
}

/// Full upstream formula text and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamContent {
    pub text: String,
    pub source_url: String,
}

/// Source of upstream versions and formula text
pub trait UpstreamSource: Send + Sync {
    /// Look up the stable version of an upstream formula
    ///
    /// A formula the registry does not know is `Ok(VersionLookup::NotFound)`,
    /// not an error.
    fn fetch_version(&self, upstream_name: &str) -> Result<VersionLookup>;

    /// Fetch the complete formula text
    ///
    /// Unlike version lookup, a missing formula is an error here.
    fn fetch_content(&self, upstream_name: &str) -> Result<UpstreamContent>;
}
