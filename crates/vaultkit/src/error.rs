//! Error types for config, vault and plugin operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Config file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Config file already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize config for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config {}: {message}", path.display())]
    Validation { path: PathBuf, message: String },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Vault resolution errors
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("No vaults found for {pattern}")]
    NoTargetsFound { pattern: String },

    #[error("Invalid vault pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Failed to read Obsidian vault list {}: {message}", path.display())]
    ObsidianConfig { path: PathBuf, message: String },

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Plugin storage errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid plugin manifest {}: {message}", path.display())]
    InvalidManifest { path: PathBuf, message: String },

    #[error("Invalid enabled plugin list {}: {message}", path.display())]
    InvalidEnabledList { path: PathBuf, message: String },

    #[error("Plugin directory already present: {}", path.display())]
    AlreadyPresent { path: PathBuf },

    #[error("Invalid plugin id '{id}'")]
    InvalidId { id: String },
}

impl PluginError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
