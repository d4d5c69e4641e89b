//! HTTP client for the package registry.
//!
//! The registry is a static file layout: the manifest lives at
//! `{base}/packages.json` and archives at `{base}/packages/{filename}`.
//! Transport is blocking and sequential; a single failure is fatal to the
//! run, with no retries.

use crate::manifest::{Manifest, ManifestError};
use sha2::{Digest, Sha256};
use std::time::Duration;
use thiserror::Error;

/// Registry base URL used when no override is configured.
pub const DEFAULT_REGISTRY_URL: &str = "https://matpak.github.io/registry";

/// Errors that can occur during registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Network error: the registry could not be reached.
    #[error("could not reach the package registry: {0}")]
    Network(String),

    /// The registry answered with a non-success status.
    #[error("registry returned HTTP {status} for {url}")]
    Http {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The fetched manifest failed to parse or validate.
    #[error("invalid registry manifest: {0}")]
    Manifest(#[from] ManifestError),
}

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the registry file layout.
    pub base_url: String,
    /// User agent for HTTP requests.
    pub user_agent: String,
    /// Timeout applied to each request.
    pub timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("MATPAK_REGISTRY")
                .unwrap_or_else(|_| DEFAULT_REGISTRY_URL.to_string()),
            user_agent: format!("matpak/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Blocking client for the package registry.
pub struct RegistryClient {
    config: RegistryConfig,
    http_client: reqwest::blocking::Client,
}

impl RegistryClient {
    /// Create a new registry client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry client with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(config: RegistryConfig) -> Result<Self, RegistryError> {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .build()
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// URL of the registry manifest.
    #[must_use]
    pub fn manifest_url(&self) -> String {
        format!("{}/packages.json", self.base())
    }

    /// URL of a package archive.
    #[must_use]
    pub fn artifact_url(&self, filename: &str) -> String {
        format!("{}/packages/{filename}", self.base())
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Fetch and parse the registry manifest.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the registry is unreachable or answers
    /// with a non-success status, or a manifest error when the payload does
    /// not parse as a valid manifest.
    pub fn fetch_manifest(&self) -> Result<Manifest, RegistryError> {
        let url = self.manifest_url();
        tracing::debug!(%url, "fetching package manifest");
        let bytes = self.get(&url)?;
        Ok(Manifest::from_slice(&bytes)?)
    }

    /// Download a package archive to memory.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the download fails.
    pub fn download_artifact(&self, filename: &str) -> Result<Vec<u8>, RegistryError> {
        let url = self.artifact_url(filename);
        tracing::debug!(%url, "downloading package archive");
        self.get(&url)
    }

    fn get(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .map_err(|e| RegistryError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RegistryError::Http {
                status: response.status(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| RegistryError::Network(e.to_string()))
    }
}

/// SHA256 checksum of an archive, hex encoded.
///
/// Recorded in the installed index for `matpak list`; no verification is
/// performed against it.
#[must_use]
pub fn artifact_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> RegistryClient {
        RegistryClient::with_config(RegistryConfig {
            base_url: base_url.to_string(),
            user_agent: String::from("matpak/test"),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_manifest_url() {
        let client = client("https://example.org/registry");
        assert_eq!(
            client.manifest_url(),
            "https://example.org/registry/packages.json"
        );
    }

    #[test]
    fn test_urls_tolerate_trailing_slash() {
        let client = client("https://example.org/registry/");
        assert_eq!(
            client.manifest_url(),
            "https://example.org/registry/packages.json"
        );
        assert_eq!(
            client.artifact_url("plotting-0.4.1.mlp"),
            "https://example.org/registry/packages/plotting-0.4.1.mlp"
        );
    }

    #[test]
    fn test_artifact_url() {
        let client = client("https://example.org/registry");
        assert_eq!(
            client.artifact_url("signal-tools-1.2.0.mlp"),
            "https://example.org/registry/packages/signal-tools-1.2.0.mlp"
        );
    }

    #[test]
    fn test_artifact_checksum_known_value() {
        assert_eq!(
            artifact_checksum(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_artifact_checksum_is_stable() {
        let data = b"matpak archive bytes";
        assert_eq!(artifact_checksum(data), artifact_checksum(data));
        assert_ne!(artifact_checksum(data), artifact_checksum(b"other"));
    }

    #[test]
    fn test_default_config_user_agent() {
        let config = RegistryConfig::default();
        assert!(config.user_agent.starts_with("matpak/"));
        assert_eq!(config.timeout, Duration::from_secs(60));
    }
}
