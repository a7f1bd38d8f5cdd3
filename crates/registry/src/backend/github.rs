//! GitHub backend.
//!
//! This module provides the [`GitHubBackend`] implementation that reads the
//! community registry from the `obsidian-releases` repository and downloads
//! release assets from plugin repositories.
//!
//! # Rate Limiting
//!
//! GitHub throttles anonymous traffic. Throttled requests surface as
//! [`Error::RateLimited`] so callers can tell them apart from missing plugins.

use crate::backend::Backend;
use crate::error::{Error, Result};
use std::time::Duration;

/// Community registry document.
pub const REGISTRY_URL: &str =
    "https://raw.githubusercontent.com/obsidianmd/obsidian-releases/master/community-plugins.json";

/// Base URL for release downloads.
pub const DOWNLOAD_BASE: &str = "https://github.com";

/// Global request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum body size (plugin bundles are small, the registry is a few MB).
const MAX_BODY_SIZE: u64 = 50 * 1024 * 1024;

const USER_AGENT: &str = concat!("ovm/", env!("CARGO_PKG_VERSION"));

/// GitHub registry backend.
///
/// # Example
///
/// ```no_run
/// use registry::backend::github::GitHubBackend;
/// use registry::backend::Backend;
///
/// let backend = GitHubBackend::new();
/// let body = backend.fetch_registry().unwrap();
/// println!("Registry is {} bytes", body.len());
/// ```
pub struct GitHubBackend {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Registry document URL.
    registry_url: String,
    /// Release download base URL.
    download_base: String,
}

impl GitHubBackend {
    /// Create a new GitHub backend with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a backend with a custom global timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self {
            agent,
            registry_url: REGISTRY_URL.to_string(),
            download_base: DOWNLOAD_BASE.to_string(),
        }
    }

    /// Create a backend with custom URLs (for mirrors and testing).
    #[must_use]
    pub fn with_urls(registry_url: impl Into<String>, download_base: impl Into<String>) -> Self {
        Self {
            registry_url: registry_url.into(),
            download_base: download_base.into(),
            ..Self::new()
        }
    }

    /// Get the registry URL.
    #[must_use]
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Build the download URL for a release asset.
    fn asset_url(&self, repo: &str, version: &str, file: &str) -> String {
        if version == crate::types::LATEST {
            format!("{}/{}/releases/latest/download/{}", self.download_base, repo, file)
        } else {
            format!(
                "{}/{}/releases/download/{}/{}",
                self.download_base, repo, version, file
            )
        }
    }

    fn get_bytes(&self, url: &str) -> std::result::Result<Vec<u8>, ureq::Error> {
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()?;

        response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_SIZE)
            .read_to_vec()
    }
}

impl Default for GitHubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for GitHubBackend {
    fn fetch_registry(&self) -> Result<Vec<u8>> {
        log::debug!("GET {}", self.registry_url);
        Ok(self.get_bytes(&self.registry_url)?)
    }

    fn download(&self, repo: &str, version: &str, file: &str) -> Result<Vec<u8>> {
        let url = self.asset_url(repo, version, file);
        log::debug!("GET {url}");

        match self.get_bytes(&url) {
            Ok(bytes) => Ok(bytes),
            Err(ureq::Error::StatusCode(404)) => Err(Error::AssetNotFound {
                repo: repo.to_string(),
                version: version.to_string(),
                file: file.to_string(),
            }),
            Err(ureq::Error::StatusCode(code)) => Err(Error::from_status(code)),
            Err(e) => Err(Error::DownloadFailed {
                repo: repo.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
