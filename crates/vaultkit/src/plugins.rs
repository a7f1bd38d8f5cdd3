//! Installed plugins of a vault
//!
//! A plugin is installed when `.obsidian/plugins/<id>/` exists. There is no
//! separate index; the enabled list in `community-plugins.json` is only
//! touched on request.

use crate::atomic;
use crate::error::PluginError;
use crate::vault::Vault;
use crate::MANIFEST_FILE;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Prefix of staging directories inside the plugins directory
const STAGING_PREFIX: &str = ".ovm-";

/// The parts of a plugin's `manifest.json` we read
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginManifest {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub version: String,
}

/// Whether `id` names exactly one directory directly under the plugins directory
///
/// Rejects empty ids, `.`/`..`, path separators and hidden names, so an id
/// can never resolve to the plugins directory itself or anything outside it.
pub fn is_valid_id(id: &str) -> bool {
    if id.is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == id
    )
}

pub fn check_id(id: &str) -> Result<(), PluginError> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(PluginError::InvalidId { id: id.to_string() })
    }
}

pub fn is_installed(vault: &Vault, id: &str) -> bool {
    is_valid_id(id) && vault.plugin_dir(id).is_dir()
}

/// Ids of installed plugins, sorted
///
/// A missing plugins directory means nothing is installed. Hidden entries
/// (including interrupted staging directories) are ignored.
pub fn list_installed(vault: &Vault) -> Result<Vec<String>, PluginError> {
    let dir = vault.plugins_dir();
    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PluginError::io(dir, e)),
    };

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PluginError::io(&dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if entry.path().is_dir() {
            ids.push(name);
        }
    }
    ids.sort();
    Ok(ids)
}

/// Remove a plugin directory
///
/// Returns `false` if it was already gone.
pub fn remove(vault: &Vault, id: &str) -> Result<bool, PluginError> {
    check_id(id)?;
    let dir = vault.plugin_dir(id);
    match fs::remove_dir_all(&dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(PluginError::io(dir, e)),
    }
}

/// Install plugin files as `plugins/<id>/`
///
/// Files are staged in a hidden directory next to the destination and the
/// directory is renamed into place, so a failure leaves nothing behind.
pub fn place(vault: &Vault, id: &str, files: &[(&str, &[u8])]) -> Result<PathBuf, PluginError> {
    check_id(id)?;
    let plugins_dir = vault.plugins_dir();
    let dest = vault.plugin_dir(id);
    if dest.exists() {
        return Err(PluginError::AlreadyPresent { path: dest });
    }

    fs::create_dir_all(&plugins_dir).map_err(|e| PluginError::io(&plugins_dir, e))?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(&plugins_dir)
        .map_err(|e| PluginError::io(&plugins_dir, e))?;

    for (name, data) in files {
        let path = staging.path().join(name);
        fs::write(&path, data).map_err(|e| PluginError::io(path, e))?;
    }

    fs::rename(staging.path(), &dest).map_err(|e| PluginError::io(&dest, e))?;
    log::debug!("Placed {} file(s) in {}", files.len(), dest.display());
    Ok(dest)
}

pub fn read_manifest(vault: &Vault, id: &str) -> Result<PluginManifest, PluginError> {
    check_id(id)?;
    let path = vault.plugin_dir(id).join(MANIFEST_FILE);
    let content = fs::read_to_string(&path).map_err(|e| PluginError::io(&path, e))?;
    serde_json::from_str(&content).map_err(|e| PluginError::InvalidManifest {
        path,
        message: e.to_string(),
    })
}

// ============================================================================
// Enabled list
// ============================================================================

/// Ids listed in `community-plugins.json`, in file order
pub fn enabled(vault: &Vault) -> Result<Vec<String>, PluginError> {
    let path = vault.community_plugins_file();
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(PluginError::io(path, e)),
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&content).map_err(|e| PluginError::InvalidEnabledList {
        path,
        message: e.to_string(),
    })
}

fn write_enabled(vault: &Vault, ids: &[String]) -> Result<(), PluginError> {
    let path = vault.community_plugins_file();
    let json = serde_json::to_string_pretty(ids).map_err(|e| PluginError::InvalidEnabledList {
        path: path.clone(),
        message: e.to_string(),
    })?;
    atomic::write_atomic(&path, json.as_bytes()).map_err(|e| PluginError::io(path, e))
}

/// Add `id` to the enabled list, creating the file if needed
///
/// Returns `true` if the list changed.
pub fn enable(vault: &Vault, id: &str) -> Result<bool, PluginError> {
    let mut ids = enabled(vault)?;
    if ids.iter().any(|existing| existing == id) {
        return Ok(false);
    }
    ids.push(id.to_string());
    write_enabled(vault, &ids)?;
    Ok(true)
}

/// Drop `id` from the enabled list
///
/// Returns `true` if the list changed. A missing file is left missing.
pub fn disable(vault: &Vault, id: &str) -> Result<bool, PluginError> {
    let mut ids = enabled(vault)?;
    let before = ids.len();
    ids.retain(|existing| existing != id);
    if ids.len() == before {
        return Ok(false);
    }
    write_enabled(vault, &ids)?;
    Ok(true)
}

/// Total size in bytes of the files under `path`
pub fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}
