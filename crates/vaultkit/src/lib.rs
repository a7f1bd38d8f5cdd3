//! # vaultkit
//!
//! Filesystem side of managing Obsidian vaults.
//!
//! - [`config`]: the `ovm.json` file listing the plugins every vault should have
//! - [`vault`]: finding vaults by glob pattern or through Obsidian's own registry
//! - [`plugins`]: what is installed in a vault and how to change it
//!
//! Writes go through a temporary file or directory in the same parent and
//! are renamed into place, so readers never see a half-written file.

pub mod atomic;
pub mod config;
pub mod error;
pub mod plugins;
pub mod vault;

pub use config::{Config, PluginEntry};
pub use error::{ConfigError, PluginError, VaultError};
pub use plugins::PluginManifest;
pub use vault::{Discovery, ObsidianDiscovery, Vault, find_by_pattern, resolve_targets};

/// Per-vault settings directory.
pub const OBSIDIAN_DIR: &str = ".obsidian";

/// Plugin directory inside [`OBSIDIAN_DIR`].
pub const PLUGINS_DIR: &str = "plugins";

/// List of enabled community plugins inside [`OBSIDIAN_DIR`].
pub const COMMUNITY_PLUGINS_FILE: &str = "community-plugins.json";

/// Manifest shipped with every plugin.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "ovm.json";
