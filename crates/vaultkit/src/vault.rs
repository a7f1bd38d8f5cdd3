//! Vault discovery
//!
//! A vault is any directory containing a `.obsidian/` directory. Vaults are
//! found either by glob pattern or from the list Obsidian keeps of the
//! vaults it has opened.

use crate::error::VaultError;
use crate::{COMMUNITY_PLUGINS_FILE, OBSIDIAN_DIR, PLUGINS_DIR};
use glob::MatchOptions;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A local Obsidian vault
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vault {
    /// Directory basename
    pub name: String,
    /// Absolute path of the vault directory
    pub path: PathBuf,
}

impl Vault {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self { name, path }
    }

    pub fn obsidian_dir(&self) -> PathBuf {
        self.path.join(OBSIDIAN_DIR)
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.obsidian_dir().join(PLUGINS_DIR)
    }

    pub fn plugin_dir(&self, id: &str) -> PathBuf {
        self.plugins_dir().join(id)
    }

    pub fn community_plugins_file(&self) -> PathBuf {
        self.obsidian_dir().join(COMMUNITY_PLUGINS_FILE)
    }
}

impl batch::BatchTarget for Vault {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// Default discovery
// ============================================================================

/// Source of vaults when no pattern is given
pub trait Discovery {
    fn discover(&self) -> Result<Vec<Vault>, VaultError>;
}

/// Reads the vault list Obsidian keeps in `obsidian.json`
pub struct ObsidianDiscovery {
    config_file: PathBuf,
}

#[derive(Deserialize)]
struct ObsidianState {
    #[serde(default)]
    vaults: BTreeMap<String, ObsidianVault>,
}

#[derive(Deserialize)]
struct ObsidianVault {
    path: PathBuf,
}

impl ObsidianDiscovery {
    pub fn new(config_file: impl Into<PathBuf>) -> Self {
        Self {
            config_file: config_file.into(),
        }
    }

    /// `<platform config dir>/obsidian/obsidian.json`
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("obsidian").join("obsidian.json"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }
}

impl Discovery for ObsidianDiscovery {
    fn discover(&self) -> Result<Vec<Vault>, VaultError> {
        let content = match fs::read_to_string(&self.config_file) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No Obsidian vault list at {}", self.config_file.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(VaultError::Io {
                    path: self.config_file.clone(),
                    source: e,
                });
            }
        };

        let state: ObsidianState =
            serde_json::from_str(&content).map_err(|e| VaultError::ObsidianConfig {
                path: self.config_file.clone(),
                message: e.to_string(),
            })?;

        let paths: BTreeSet<PathBuf> = state
            .vaults
            .into_values()
            .map(|v| v.path)
            .filter(|path| {
                let exists = path.is_dir();
                if !exists {
                    log::debug!("Skipping missing vault {}", path.display());
                }
                exists
            })
            .collect();

        Ok(paths.into_iter().map(Vault::from_path).collect())
    }
}

// ============================================================================
// Pattern discovery
// ============================================================================

/// Turn a user pattern into a glob matching `.obsidian` directories
fn obsidian_glob(pattern: &str) -> Result<String, VaultError> {
    let expanded = shellexpand::full(pattern).map_err(|e| VaultError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut glob = expanded.trim_end_matches(['/', '\\']).to_string();
    if !glob.ends_with(OBSIDIAN_DIR) {
        glob.push_str("/**/");
        glob.push_str(OBSIDIAN_DIR);
    }

    if Path::new(&glob).is_relative() {
        let cwd = std::env::current_dir().map_err(|e| VaultError::Io {
            path: PathBuf::from("."),
            source: e,
        })?;
        glob = cwd.join(glob).display().to_string();
    }

    Ok(glob)
}

/// Find vaults whose `.obsidian` directory matches `pattern`
///
/// Matching is case-insensitive and descends into hidden directories.
/// Results are deduplicated and sorted by path.
pub fn find_by_pattern(pattern: &str) -> Result<Vec<Vault>, VaultError> {
    let glob = obsidian_glob(pattern)?;
    log::debug!("Searching for vaults with {glob}");

    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    let matches = glob::glob_with(&glob, options).map_err(|e| VaultError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut paths = BTreeSet::new();
    for entry in matches {
        match entry {
            Ok(path) if path.is_dir() => {
                if let Some(vault_dir) = path.parent() {
                    paths.insert(vault_dir.to_path_buf());
                }
            }
            Ok(_) => {}
            Err(e) => log::debug!("Skipping unreadable path: {e}"),
        }
    }

    Ok(paths.into_iter().map(Vault::from_path).collect())
}

/// Resolve the target set for a command
///
/// An empty pattern falls back to `discovery`. Finding nothing is an error.
pub fn resolve_targets(pattern: &str, discovery: &dyn Discovery) -> Result<Vec<Vault>, VaultError> {
    let pattern = pattern.trim();
    let vaults = if pattern.is_empty() {
        discovery.discover()?
    } else {
        find_by_pattern(pattern)?
    };

    if vaults.is_empty() {
        return Err(VaultError::NoTargetsFound {
            pattern: if pattern.is_empty() {
                "the Obsidian vault list".to_string()
            } else {
                format!("'{pattern}'")
            },
        });
    }

    Ok(vaults)
}
