//! Centralized path resolution for ovm
//!
//! # Environment Variables
//!
//! - `OVM_CONFIG` - Override the config file (default `~/ovm.json`)
//! - `OVM_CACHE_DIR` - Override the cache directory
//! - `OVM_STATE_DIR` - Override the state directory (command logs)
//!
//! # Path Resolution Priority
//!
//! For config_file():
//! 1. `-c/--config` flag
//! 2. `OVM_CONFIG` environment variable
//! 3. `~/ovm.json`
//!
//! For cache_dir():
//! 1. `OVM_CACHE_DIR` environment variable
//! 2. `XDG_CACHE_HOME/ovm` (if set)
//! 3. Platform cache directory + `ovm`
//!
//! For state_dir():
//! 1. `OVM_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/ovm` (if set)
//! 3. Platform default:
//!    - Windows: `%LOCALAPPDATA%\ovm`
//!    - macOS/Linux: `~/.local/state/ovm`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for config file override
pub const ENV_CONFIG: &str = "OVM_CONFIG";

/// Environment variable for cache directory override
pub const ENV_CACHE_DIR: &str = "OVM_CACHE_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "OVM_STATE_DIR";

/// Log of `vaults run` executions inside the state directory
const CUSTOM_COMMANDS_LOG: &str = "custom-commands.log";

/// Get the config file path
pub fn config_file(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(expand(&path.to_string_lossy()));
    }

    if let Ok(file) = std::env::var(ENV_CONFIG) {
        let path = expand(&file);
        log::debug!("Using config file from {}: {}", ENV_CONFIG, path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(vaultkit::CONFIG_FILE_NAME))
}

/// Get the ovm cache directory path
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CACHE_DIR) {
        let path = expand(&dir);
        log::debug!("Using cache dir from {}: {}", ENV_CACHE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_cache) = std::env::var("XDG_CACHE_HOME") {
        return Ok(PathBuf::from(xdg_cache).join("ovm"));
    }

    let cache = dirs::cache_dir().context("Could not determine cache directory")?;
    Ok(cache.join("ovm"))
}

/// Directory holding the cached plugin registry
pub fn registry_cache_dir() -> Result<PathBuf> {
    Ok(cache_dir()?.join("registry"))
}

/// Get the ovm state directory path
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg_state).join("ovm"));
    }

    #[cfg(windows)]
    {
        if let Some(local_app_data) = dirs::data_local_dir() {
            return Ok(local_app_data.join("ovm"));
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".local").join("state").join("ovm"))
}

/// Log file for `vaults run`
pub fn custom_commands_log() -> Result<PathBuf> {
    Ok(state_dir()?.join(CUSTOM_COMMANDS_LOG))
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left as-is.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================
