// src/config.rs

//! Runtime configuration
//!
//! All static tables (name overrides, alternate raw sources) and endpoints
//! live here with built-in defaults. A TOML file can override any field;
//! a table given in the file replaces the built-in table of the same name.
//!
//! ```toml
//! private_prefix = "gov-"
//! jobs = 4
//! version_fallback = "natural"
//!
//! [overrides]
//! gov-md2man = "go-md2man"
//!
//! [alternate_sources]
//! sdkman-cli = "https://raw.githubusercontent.com/sdkman/homebrew-tap/master/Formula/sdkman-cli.rb"
//! ```

use crate::error::{Error, Result};
use crate::version::FallbackOrdering;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Private identifier → upstream identifier
pub type NameOverrideTable = BTreeMap<String, String>;

/// Upstream identifier → raw formula URL outside the primary registry
pub type AlternateSourceTable = BTreeMap<String, String>;

/// Names of the environment variables tapdrift reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvNames {
    pub username: String,
    pub token: String,
    pub tap_url: String,
}

impl Default for EnvNames {
    fn default() -> Self {
        Self {
            username: "BITBUCKET_USER".to_string(),
            token: "BITBUCKET_TOKEN".to_string(),
            tap_url: "PRIVATE_TAP_URL".to_string(),
        }
    }
}

/// tapdrift configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Namespace prefix of private formula names
    pub private_prefix: String,

    /// Namespace prefix of private formula class names
    pub class_prefix: String,

    /// Formula directory inside the tap
    pub formula_dir: String,

    /// Formula file extension, without the dot
    pub formula_extension: String,

    /// Local mirror of the private tap
    pub cache_dir: PathBuf,

    /// Registry API base; `<base>/<name>.json` is queried
    pub registry_api_url: String,

    /// Raw formula base; `<base>/<first-letter>/<name>.rb` is fetched
    pub raw_formula_url: String,

    pub primary_branch: String,
    pub secondary_branch: String,

    /// Timeout for each HTTP request
    pub http_timeout_secs: u64,

    /// Timeout for each git command
    pub git_timeout_secs: u64,

    /// Worker threads for upstream lookups
    pub jobs: usize,

    /// Ordering used when a version does not parse
    pub version_fallback: FallbackOrdering,

    pub env: EnvNames,

    pub overrides: NameOverrideTable,

    pub alternate_sources: AlternateSourceTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            private_prefix: "gov-".to_string(),
            class_prefix: "Gov".to_string(),
            formula_dir: "Formula".to_string(),
            formula_extension: "rb".to_string(),
            cache_dir: PathBuf::from(".cache/private-tap"),
            registry_api_url: "https://formulae.brew.sh/api/formula".to_string(),
            raw_formula_url:
                "https://raw.githubusercontent.com/Homebrew/homebrew-core/refs/heads/master/Formula"
                    .to_string(),
            primary_branch: "main".to_string(),
            secondary_branch: "master".to_string(),
            http_timeout_secs: 30,
            git_timeout_secs: 300,
            jobs: 8,
            version_fallback: FallbackOrdering::Lexical,
            env: EnvNames::default(),
            overrides: default_overrides(),
            alternate_sources: default_alternate_sources(),
        }
    }
}

fn default_overrides() -> NameOverrideTable {
    [
        ("gov-filter-repo", "git-filter-repo"),
        ("gov-md2man", "go-md2man"),
        ("gov-swift-package-list", "swift-package-list"),
        ("gov-shebang-probe", "scriptisto"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_alternate_sources() -> AlternateSourceTable {
    [
        (
            "sdkman-cli",
            "https://raw.githubusercontent.com/sdkman/homebrew-tap/master/Formula/sdkman-cli.rb",
        ),
        (
            "danger-js",
            "https://raw.githubusercontent.com/danger/homebrew-tap/master/danger-js.rb",
        ),
        (
            "swift-package-list",
            "https://raw.githubusercontent.com/FelixHerrmann/homebrew-tap/master/Formula/swift-package-list.rb",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Config {
    /// Parse a configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, or the built-in defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(Error::ConfigError("jobs must be at least 1".to_string()));
        }
        if self.http_timeout_secs == 0 || self.git_timeout_secs == 0 {
            return Err(Error::ConfigError("timeouts must be non-zero".to_string()));
        }
        if self.primary_branch.is_empty() || self.secondary_branch.is_empty() {
            return Err(Error::ConfigError("branch names must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout_secs)
    }

    /// Read the private tap URL from the environment
    pub fn tap_url_from_env(&self) -> Result<String> {
        required_env(&self.env.tap_url)
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::ConfigError(format!(
            "missing environment variable {}",
            name
        ))),
    }
}

/// Username and token for the private tap's git remote
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    /// Resolve credentials from the configured environment variables
    ///
    /// Both variables must be set and non-empty.
    pub fn from_env(names: &EnvNames) -> Result<Self> {
        let username = std::env::var(&names.username).unwrap_or_default();
        let token = std::env::var(&names.token).unwrap_or_default();

        if username.is_empty() || token.is_empty() {
            return Err(Error::ConfigError(format!(
                "missing {} / {} env vars",
                names.username, names.token
            )));
        }

        Ok(Self::new(username, token))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}
