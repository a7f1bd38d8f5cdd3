//! Core types for registry operations.

use serde::{Deserialize, Serialize};

/// Version placeholder resolving to the newest release.
pub const LATEST: &str = "latest";

/// One entry of the community plugin registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Plugin id, also the directory name inside a vault.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Author name.
    #[serde(default)]
    pub author: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// GitHub repository `owner/name` hosting the releases.
    pub repo: String,
}

/// A file published with every plugin release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginFile {
    /// Asset name.
    pub name: &'static str,
    /// Whether a release without this file is broken.
    pub required: bool,
}

/// Release assets making up an installed plugin, in download order.
pub const PLUGIN_FILES: &[PluginFile] = &[
    PluginFile {
        name: "main.js",
        required: true,
    },
    PluginFile {
        name: "manifest.json",
        required: true,
    },
    PluginFile {
        name: "styles.css",
        required: false,
    },
];

/// A downloaded release asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Asset name.
    pub name: String,
    /// Raw contents.
    pub data: Vec<u8>,
}
