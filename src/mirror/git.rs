// src/mirror/git.rs

//! Git transport for the tap mirror
//!
//! `GitCli` drives the system `git` binary. Credentials are handed to git
//! as an HTTP `Authorization` header through `GIT_CONFIG_*` environment
//! variables (git 2.31+), so they never show up in the process arguments
//! or in the remote URL stored in `.git/config`.

use crate::config::Credentials;
use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::debug;
use wait_timeout::ChildExt;

/// Default timeout for a single git command (5 minutes)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Result of a successful pull
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// New commits were fetched and checked out
    Updated,
    /// The branch tip was already checked out
    UpToDate,
}

/// Shallow, single-branch git operations
pub trait GitTransport {
    /// Clone only the tip of `branch` from `url` into `dest`
    fn clone_branch(&self, dest: &Path, url: &str, branch: &str) -> Result<()>;

    /// Bring the working copy at `dest` to the tip of `branch` on `origin`
    fn pull_branch(&self, dest: &Path, branch: &str) -> Result<PullOutcome>;
}

/// Basic-auth header value for a credential pair
pub fn basic_auth_header(credentials: &Credentials) -> String {
    let raw = format!("{}:{}", credentials.username(), credentials.token());
    format!("Authorization: Basic {}", STANDARD.encode(raw))
}

/// Git transport backed by the `git` command-line tool
pub struct GitCli {
    git: PathBuf,
    auth_header: String,
    timeout: Duration,
}

impl GitCli {
    /// Locate `git` on `PATH` and bind it to a credential pair
    pub fn new(credentials: &Credentials) -> Result<Self> {
        let git = which::which("git").map_err(|e| {
            Error::ConfigError(format!("git executable not found: {}. Is git installed?", e))
        })?;

        Ok(Self {
            git,
            auth_header: basic_auth_header(credentials),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, workdir: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.git);
        // Explicit git dir: a broken mirror must fail, not resolve to an enclosing repository
        if let Some(dir) = workdir {
            cmd.arg("--git-dir")
                .arg(dir.join(".git"))
                .arg("--work-tree")
                .arg(dir);
        }
        cmd.env("GIT_TERMINAL_PROMPT", "0")
            .env("GIT_CONFIG_COUNT", "1")
            .env("GIT_CONFIG_KEY_0", "http.extraHeader")
            .env("GIT_CONFIG_VALUE_0", &self.auth_header)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Run a git command with the configured timeout and return its stdout
    fn run(&self, mut cmd: Command, what: &str) -> Result<String> {
        debug!("Running git {}", what);

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::GitError(format!("Failed to spawn git {}: {}", what, e)))?;

        match child.wait_timeout(self.timeout)? {
            Some(status) => {
                let output = child.wait_with_output()?;
                let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
                let stderr = String::from_utf8_lossy(&output.stderr);

                if status.success() {
                    Ok(stdout)
                } else {
                    let code = status.code().unwrap_or(-1);
                    Err(Error::GitError(format!(
                        "git {} failed with exit code {}: {}",
                        what,
                        code,
                        stderr.trim()
                    )))
                }
            }
            None => {
                // Timeout - kill the process
                let _ = child.kill();
                let _ = child.wait();
                Err(Error::TransportError(format!(
                    "git {} timed out after {} seconds",
                    what,
                    self.timeout.as_secs()
                )))
            }
        }
    }

    fn rev_parse(&self, dest: &Path, rev: &str) -> Result<String> {
        let mut cmd = self.command(Some(dest));
        cmd.args(["rev-parse", "--verify", rev]);
        Ok(self.run(cmd, &format!("rev-parse {}", rev))?.trim().to_string())
    }
}

impl GitTransport for GitCli {
    fn clone_branch(&self, dest: &Path, url: &str, branch: &str) -> Result<()> {
        let mut cmd = self.command(None);
        cmd.args([
            "clone",
            "--quiet",
            "--depth",
            "1",
            "--single-branch",
            "--branch",
            branch,
            "--",
            url,
        ])
        .arg(dest);

        self.run(cmd, &format!("clone {}", branch))?;
        Ok(())
    }

    fn pull_branch(&self, dest: &Path, branch: &str) -> Result<PullOutcome> {
        let mut fetch = self.command(Some(dest));
        fetch.args(["fetch", "--quiet", "--depth", "1", "origin", branch]);
        self.run(fetch, &format!("fetch {}", branch))?;

        let head = self.rev_parse(dest, "HEAD")?;
        let fetched = self.rev_parse(dest, "FETCH_HEAD")?;
        if head == fetched {
            return Ok(PullOutcome::UpToDate);
        }

        let mut reset = self.command(Some(dest));
        reset.args(["reset", "--quiet", "--hard", "FETCH_HEAD"]);
        self.run(reset, &format!("reset to {}", branch))?;
        Ok(PullOutcome::Updated)
    }
}
