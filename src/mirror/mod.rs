// src/mirror/mod.rs

//! Local mirror of the private tap
//!
//! The mirror directory is the only record of state: if it exists it is
//! pulled, otherwise it is cloned. Taps default to either `main` or
//! `master`, so every operation tries the primary branch first and the
//! secondary branch second. A copy that cannot be pulled on either branch
//! is treated as corrupt, deleted and cloned again.
//!
//! Only the latest tree is ever needed for text scanning, so all transfers
//! are shallow and single-branch.

mod git;

pub use git::{basic_auth_header, GitCli, GitTransport, PullOutcome};

use crate::config::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Whether a mirror directory exists on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorState {
    Absent,
    Present,
}

impl MirrorState {
    pub fn detect(path: &Path) -> Result<Self> {
        match path.try_exists() {
            Ok(true) => Ok(MirrorState::Present),
            Ok(false) => Ok(MirrorState::Absent),
            Err(e) => Err(Error::IoError(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// Keeps a shallow working copy of a remote repository up to date
pub struct RepoMirror<G: GitTransport> {
    git: G,
    primary_branch: String,
    secondary_branch: String,
}

impl<G: GitTransport> RepoMirror<G> {
    pub fn new(
        git: G,
        primary_branch: impl Into<String>,
        secondary_branch: impl Into<String>,
    ) -> Self {
        Self {
            git,
            primary_branch: primary_branch.into(),
            secondary_branch: secondary_branch.into(),
        }
    }

    pub fn from_config(git: G, config: &Config) -> Self {
        Self::new(
            git,
            config.primary_branch.clone(),
            config.secondary_branch.clone(),
        )
    }

    /// Make sure `destination` holds an up-to-date copy of `remote_url`
    ///
    /// Returns the mirror path. Fails with [`Error::MirrorUnavailable`] when
    /// neither branch can be cloned, including after deleting a corrupt copy.
    pub fn ensure(&self, destination: &Path, remote_url: &str) -> Result<PathBuf> {
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::IoError(format!(
                        "Failed to create directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        match MirrorState::detect(destination)? {
            MirrorState::Absent => {
                info!("Cloning {} into {}", remote_url, destination.display());
                self.clone_with_fallback(destination, remote_url)?;
            }
            MirrorState::Present => match self.pull_with_fallback(destination) {
                Ok(PullOutcome::UpToDate) => {
                    info!("Mirror {} already up to date", destination.display());
                }
                Ok(PullOutcome::Updated) => {
                    info!("Mirror {} updated", destination.display());
                }
                Err(e) => {
                    warn!(
                        "Mirror {} could not be updated ({}), re-cloning",
                        destination.display(),
                        e
                    );
                    remove_path(destination)?;
                    self.clone_with_fallback(destination, remote_url)?;
                }
            },
        }

        Ok(destination.to_path_buf())
    }

    fn clone_with_fallback(&self, destination: &Path, remote_url: &str) -> Result<()> {
        let primary_err = match self
            .git
            .clone_branch(destination, remote_url, &self.primary_branch)
        {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        warn!(
            "Clone of branch {} failed ({}), trying {}",
            self.primary_branch, primary_err, self.secondary_branch
        );

        // A failed clone can leave a partial directory behind
        if destination.exists() {
            remove_path(destination)?;
        }

        self.git
            .clone_branch(destination, remote_url, &self.secondary_branch)
            .map_err(|secondary_err| {
                Error::MirrorUnavailable(format!(
                    "clone {} failed: {}; clone {} failed: {}",
                    self.primary_branch, primary_err, self.secondary_branch, secondary_err
                ))
            })
    }

    fn pull_with_fallback(&self, destination: &Path) -> Result<PullOutcome> {
        let primary_err = match self.git.pull_branch(destination, &self.primary_branch) {
            Ok(outcome) => return Ok(outcome),
            Err(e) => e,
        };

        match self.git.pull_branch(destination, &self.secondary_branch) {
            Ok(outcome) => Ok(outcome),
            Err(secondary_err) => Err(Error::GitError(format!(
                "pull {} failed: {}; pull {} failed: {}",
                self.primary_branch, primary_err, self.secondary_branch, secondary_err
            ))),
        }
    }
}

/// Remove a mirror path, whether it is a directory or a stray file
fn remove_path(path: &Path) -> Result<()> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| Error::IoError(format!("Failed to remove {}: {}", path.display(), e)))
}
