//! Backend traits and implementations for the plugin registry.
//!
//! This module provides the [`Backend`] trait and implementations for
//! different sources. The primary implementation is [`github::GitHubBackend`]
//! which reads the community registry and release assets from GitHub.
//!
//! # Testing
//!
//! Use [`MockBackend`] for testing without network access:
//!
//! ```
//! use registry::backend::{Backend, MockBackend};
//! use registry::RegistryEntry;
//!
//! let mut mock = MockBackend::new();
//! mock.add_entry(RegistryEntry {
//!     id: "calendar".to_string(),
//!     name: "Calendar".to_string(),
//!     author: String::new(),
//!     description: String::new(),
//!     repo: "liamcain/obsidian-calendar-plugin".to_string(),
//! });
//!
//! let body = mock.fetch_registry().unwrap();
//! assert!(!body.is_empty());
//! ```

pub mod github;

use crate::error::{Error, Result};
use crate::types::RegistryEntry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Backend trait for reaching the registry.
///
/// This abstraction allows for different sources (GitHub, mirrors, etc.)
/// and enables testing.
pub trait Backend: Send + Sync {
    /// Fetch the raw community registry document.
    fn fetch_registry(&self) -> Result<Vec<u8>>;

    /// Download one release asset.
    ///
    /// # Errors
    ///
    /// Returns `Error::AssetNotFound` if the release or the file doesn't exist.
    fn download(&self, repo: &str, version: &str, file: &str) -> Result<Vec<u8>>;
}

type AssetKey = (String, String, String);

/// Mock backend for testing without network access.
///
/// Stores the registry and release assets in memory and counts registry
/// fetches so tests can assert on memoization.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    entries: Arc<Mutex<Vec<RegistryEntry>>>,
    assets: Arc<Mutex<HashMap<AssetKey, Vec<u8>>>>,
    registry_status: Arc<Mutex<Option<u16>>>,
    registry_calls: Arc<AtomicUsize>,
}

impl MockBackend {
    /// Create a new empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registry entry.
    pub fn add_entry(&mut self, entry: RegistryEntry) {
        self.entries.lock().unwrap().push(entry);
    }

    /// Add a single release asset.
    pub fn add_asset(&mut self, repo: &str, version: &str, file: &str, data: Vec<u8>) {
        self.assets
            .lock()
            .unwrap()
            .insert((repo.to_string(), version.to_string(), file.to_string()), data);
    }

    /// Add a plugin with a release whose manifest declares `version`.
    ///
    /// The release is served under `version` and under `latest`.
    pub fn add_plugin(&mut self, id: &str, repo: &str, version: &str) {
        self.add_entry(RegistryEntry {
            id: id.to_string(),
            name: id.to_string(),
            author: "tester".to_string(),
            description: String::new(),
            repo: repo.to_string(),
        });

        let manifest = format!(r#"{{"id":"{id}","name":"{id}","version":"{version}"}}"#);
        for tag in [version, crate::types::LATEST] {
            self.add_asset(repo, tag, "main.js", b"module.exports = {};".to_vec());
            self.add_asset(repo, tag, "manifest.json", manifest.clone().into_bytes());
        }
    }

    /// Make registry fetches fail with the given HTTP status.
    pub fn fail_registry(&mut self, status: u16) {
        *self.registry_status.lock().unwrap() = Some(status);
    }

    /// Number of registry fetches served so far.
    #[must_use]
    pub fn registry_calls(&self) -> usize {
        self.registry_calls.load(Ordering::SeqCst)
    }
}

impl Backend for MockBackend {
    fn fetch_registry(&self) -> Result<Vec<u8>> {
        self.registry_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(status) = *self.registry_status.lock().unwrap() {
            return Err(Error::from_status(status));
        }

        let entries = self.entries.lock().unwrap();
        Ok(serde_json::to_vec(&*entries)?)
    }

    fn download(&self, repo: &str, version: &str, file: &str) -> Result<Vec<u8>> {
        let assets = self.assets.lock().unwrap();
        assets
            .get(&(repo.to_string(), version.to_string(), file.to_string()))
            .cloned()
            .ok_or_else(|| Error::AssetNotFound {
                repo: repo.to_string(),
                version: version.to_string(),
                file: file.to_string(),
            })
    }
}
