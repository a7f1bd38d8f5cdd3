//! # registry
//!
//! Lookup and download of Obsidian community plugins.
//!
//! This crate provides functionality for:
//! - Fetching the community plugin registry (`community-plugins.json`)
//! - Caching the registry on disk with a TTL
//! - Memoizing the registry for the lifetime of a [`Client`]
//! - Downloading the release assets of a plugin
//!
//! ## Example
//!
//! ```no_run
//! use registry::{Client, LATEST};
//!
//! let client = Client::new();
//! let entry = client.find("calendar").expect("lookup failed");
//! let files = client.download_plugin(&entry, LATEST).expect("download failed");
//! println!("{} files from {}", files.len(), entry.repo);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod cache;
pub mod error;
pub mod types;

pub use backend::MockBackend;
pub use cache::{DEFAULT_TTL, DiskCache};
pub use error::{Error, ErrorCategory, Result};
pub use types::{DownloadedFile, LATEST, PLUGIN_FILES, PluginFile, RegistryEntry};

use backend::Backend;
use backend::github::GitHubBackend;
use std::sync::OnceLock;

/// Cache key of the registry document.
const REGISTRY_CACHE_KEY: &str = "community-plugins.json";

/// High-level client for registry operations.
///
/// The registry is fetched at most once per client; a failed fetch is
/// remembered too, so a batch over many vaults does not hammer a throttled
/// remote.
pub struct Client {
    backend: Box<dyn Backend>,
    cache: Option<DiskCache>,
    registry: OnceLock<Result<Vec<RegistryEntry>>>,
}

impl Client {
    /// Create a new Client with the default GitHub backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backend(Box::new(GitHubBackend::new()))
    }

    /// Create a client with a custom backend (useful for testing).
    #[must_use]
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            cache: None,
            registry: OnceLock::new(),
        }
    }

    /// Use an on-disk cache for the registry document.
    #[must_use]
    pub fn cache(mut self, cache: DiskCache) -> Self {
        self.cache = Some(cache);
        self
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// All registry entries.
    pub fn registry(&self) -> Result<&[RegistryEntry]> {
        match self.registry.get_or_init(|| self.load_registry()) {
            Ok(entries) => Ok(entries),
            Err(err) => Err(err.replay()),
        }
    }

    /// Look up a plugin by id.
    pub fn find(&self, id: &str) -> Result<RegistryEntry> {
        self.registry()?
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
            .ok_or_else(|| Error::PluginNotFound(id.to_string()))
    }

    // =========================================================================
    // Downloads
    // =========================================================================

    /// Download the release files of a plugin.
    ///
    /// Optional files missing from the release are skipped; a missing
    /// required file fails the download.
    pub fn download_plugin(
        &self,
        entry: &RegistryEntry,
        version: &str,
    ) -> Result<Vec<DownloadedFile>> {
        let mut files = Vec::with_capacity(PLUGIN_FILES.len());

        for file in PLUGIN_FILES {
            match self.backend.download(&entry.repo, version, file.name) {
                Ok(data) => files.push(DownloadedFile {
                    name: file.name.to_string(),
                    data,
                }),
                Err(Error::AssetNotFound { .. }) if !file.required => {
                    log::debug!("{}@{} has no {}", entry.repo, version, file.name);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(files)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn load_registry(&self) -> Result<Vec<RegistryEntry>> {
        if let Some(cache) = &self.cache
            && let Some(body) = cache.get(REGISTRY_CACHE_KEY)
        {
            match serde_json::from_slice(&body) {
                Ok(entries) => {
                    log::debug!("Using cached registry from {}", cache.dir().display());
                    return Ok(entries);
                }
                Err(e) => log::warn!("Ignoring corrupt registry cache: {e}"),
            }
        }

        let body = self.backend.fetch_registry()?;
        let entries: Vec<RegistryEntry> = serde_json::from_slice(&body)?;
        log::debug!("Fetched registry with {} plugins", entries.len());

        if let Some(cache) = &self.cache
            && let Err(e) = cache.put(REGISTRY_CACHE_KEY, &body)
        {
            log::warn!("Failed to cache registry: {e}");
        }

        Ok(entries)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
