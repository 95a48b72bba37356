// src/upstream/client.rs

//! HTTP client for the formula registry and raw formula text

use super::{UpstreamContent, UpstreamSource, VersionLookup};
use crate::config::{AlternateSourceTable, Config};
use crate::error::{Error, Result};
use crate::formula::extract_version;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Registry API response for a single formula
#[derive(Debug, Deserialize)]
struct FormulaApiResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    versions: FormulaVersions,
}

#[derive(Debug, Default, Deserialize)]
struct FormulaVersions {
    #[serde(default)]
    stable: Option<String>,
}

/// Registry-backed [`UpstreamSource`]
pub struct RegistryClient {
    client: Client,
    registry_api_url: String,
    raw_formula_url: String,
    alternate_sources: AlternateSourceTable,
}

impl RegistryClient {
    /// Create a client against the given registry API and raw formula bases
    pub fn new(
        registry_api_url: impl Into<String>,
        raw_formula_url: impl Into<String>,
        alternate_sources: AlternateSourceTable,
    ) -> Result<Self> {
        Self::with_timeout(
            registry_api_url,
            raw_formula_url,
            alternate_sources,
            HTTP_TIMEOUT,
        )
    }

    pub fn with_timeout(
        registry_api_url: impl Into<String>,
        raw_formula_url: impl Into<String>,
        alternate_sources: AlternateSourceTable,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tapdrift/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            registry_api_url: registry_api_url.into(),
            raw_formula_url: raw_formula_url.into(),
            alternate_sources,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(
            config.registry_api_url.clone(),
            config.raw_formula_url.clone(),
            config.alternate_sources.clone(),
            config.http_timeout(),
        )
    }

    /// Registry API location for a formula
    pub fn registry_url(&self, name: &str) -> String {
        format!("{}/{}.json", self.registry_api_url.trim_end_matches('/'), name)
    }

    /// Conventional raw text location: `<base>/<first-letter>/<name>.rb`
    pub fn raw_url(&self, name: &str) -> Result<String> {
        let first = name
            .chars()
            .next()
            .ok_or_else(|| Error::ParseError("empty formula name".to_string()))?;
        Ok(format!(
            "{}/{}/{}.rb",
            self.raw_formula_url.trim_end_matches('/'),
            first,
            name
        ))
    }

    /// Alternate raw location for a formula outside the registry, if any
    pub fn alternate_source(&self, name: &str) -> Option<&str> {
        self.alternate_sources.get(name).map(String::as_str)
    }

    fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);
        self.client
            .get(url)
            .send()
            .map_err(|e| Error::TransportError(format!("Failed to fetch {}: {}", url, e)))
    }

    fn read_text(response: Response, url: &str) -> Result<String> {
        response
            .text()
            .map_err(|e| Error::TransportError(format!("Failed to read response from {}: {}", url, e)))
    }

    fn fetch_alternate_version(&self, name: &str, raw_url: &str) -> Result<VersionLookup> {
        info!("{} not in registry, trying {}", name, raw_url);
        let response = self.get(raw_url)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(VersionLookup::NotFound);
        }
        if !status.is_success() {
            return Err(Error::MalformedResponse(format!(
                "HTTP {} from {}",
                status, raw_url
            )));
        }

        let text = Self::read_text(response, raw_url)?;
        Ok(match extract_version(&text, name) {
            Some(version) => VersionLookup::Found(version),
            None => VersionLookup::NotFound,
        })
    }
}

impl UpstreamSource for RegistryClient {
    fn fetch_version(&self, upstream_name: &str) -> Result<VersionLookup> {
        let url = self.registry_url(upstream_name);
        let response = self.get(&url)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return match self.alternate_source(upstream_name) {
                Some(raw_url) => self.fetch_alternate_version(upstream_name, raw_url),
                None => Ok(VersionLookup::NotFound),
            };
        }
        if !status.is_success() {
            return Err(Error::MalformedResponse(format!("HTTP {} from {}", status, url)));
        }

        let body = Self::read_text(response, &url)?;
        let data: FormulaApiResponse = serde_json::from_str(&body).map_err(|e| {
            Error::MalformedResponse(format!("Failed to parse registry JSON from {}: {}", url, e))
        })?;

        match data.versions.stable.as_deref().map(str::trim) {
            Some(stable) if !stable.is_empty() => {
                debug!("{} ({}) stable {}", upstream_name, data.name, stable);
                Ok(VersionLookup::Found(stable.to_string()))
            }
            _ => Ok(VersionLookup::NotFound),
        }
    }

    fn fetch_content(&self, upstream_name: &str) -> Result<UpstreamContent> {
        let url = match self.alternate_source(upstream_name) {
            Some(raw_url) => raw_url.to_string(),
            None => self.raw_url(upstream_name)?,
        };

        let response = self.get(&url)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFoundError(format!(
                "upstream formula not found (404): {}",
                url
            )));
        }
        if !status.is_success() {
            return Err(Error::MalformedResponse(format!("HTTP {} from {}", status, url)));
        }

        let text = Self::read_text(response, &url)?;
        Ok(UpstreamContent {
            text,
            source_url: url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RegistryClient {
        RegistryClient::from_config(&Config::default()).unwrap()
    }

    #[test]
    fn test_registry_url() {
        assert_eq!(
            client().registry_url("abseil"),
            "https://formulae.brew.sh/api/formula/abseil.json"
        );
        assert_eq!(
            client().registry_url("foo@2"),
            "https://formulae.brew.sh/api/formula/foo@2.json"
        );
    }

    #[test]
    fn test_raw_url_uses_first_letter() {
        assert_eq!(
            client().raw_url("abseil").unwrap(),
            "https://raw.githubusercontent.com/Homebrew/homebrew-core/refs/heads/master/Formula/a/abseil.rb"
        );
        assert!(client().raw_url("").is_err());
    }

    #[test]
    fn test_trailing_slash_in_base() {
        let c = RegistryClient::new(
            "http://localhost/api/formula/",
            "http://localhost/raw/",
            AlternateSourceTable::new(),
        )
        .unwrap();
        assert_eq!(c.registry_url("jq"), "http://localhost/api/formula/jq.json");
        assert_eq!(c.raw_url("jq").unwrap(), "http://localhost/raw/j/jq.rb");
    }

    #[test]
    fn test_alternate_source_lookup() {
        assert!(client().alternate_source("sdkman-cli").is_some());
        assert!(client().alternate_source("abseil").is_none());
    }

    #[test]
    fn test_api_response_tolerates_missing_fields() {
        let data: FormulaApiResponse = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert!(data.versions.stable.is_none());
        let data: FormulaApiResponse =
            serde_json::from_str(r#"{"name":"x","versions":{"stable":null,"head":"HEAD"}}"#)
                .unwrap();
        assert!(data.versions.stable.is_none());
    }
}
