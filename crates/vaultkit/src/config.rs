//! The `ovm.json` config file
//!
//! ```json
//! {
//!   "plugins": [
//!     { "id": "calendar" },
//!     { "id": "dataview", "version": "0.5.64" }
//!   ]
//! }
//! ```
//!
//! Unknown keys are kept and written back untouched.

use crate::atomic;
use crate::error::ConfigError;
use crate::plugins;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

/// Version used when an entry does not pin one
pub const DEFAULT_VERSION: &str = "latest";

/// A plugin every vault should have
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PluginEntry {
    pub fn new(id: impl Into<String>, version: Option<String>) -> Self {
        Self {
            id: id.into(),
            version,
            extra: BTreeMap::new(),
        }
    }

    /// Parse `id` or `id@version`
    pub fn parse(requested: &str) -> Self {
        match requested.split_once('@') {
            Some((id, version)) if !version.is_empty() => Self::new(id, Some(version.to_string())),
            Some((id, _)) => Self::new(id, None),
            None => Self::new(requested, None),
        }
    }

    /// Requested version, `latest` when unpinned
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }
}

/// Contents of `ovm.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Config {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let value: Value = serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = serde_json::from_value(value).map_err(|e| ConfigError::Validation {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        config
            .validate()
            .map_err(|message| ConfigError::Validation {
                path: path.to_path_buf(),
                message,
            })?;

        log::debug!(
            "Loaded {} plugin(s) from {}",
            config.plugins.len(),
            path.display()
        );
        Ok(config)
    }

    /// Create a config with no plugins, refusing to overwrite an existing file
    pub fn create_default(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::default();
        atomic::create_atomic(path, &config.to_bytes(path)?).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        Ok(config)
    }

    /// Write the config, replacing the file atomically
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        atomic::write_atomic(path, &self.to_bytes(path)?).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn to_bytes(&self, path: &Path) -> Result<Vec<u8>, ConfigError> {
        let mut json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;
        json.push('\n');
        Ok(json.into_bytes())
    }

    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for (idx, entry) in self.plugins.iter().enumerate() {
            if entry.id.trim().is_empty() {
                return Err(format!("plugins[{idx}]: id must not be empty"));
            }
            if !plugins::is_valid_id(&entry.id) {
                return Err(format!("plugins[{idx}]: invalid id '{}'", entry.id));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(format!("plugins[{idx}]: duplicate id '{}'", entry.id));
            }
        }
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<&PluginEntry> {
        self.plugins.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Append an entry unless its id is already listed
    ///
    /// Returns `true` if the config changed.
    pub fn add(&mut self, entry: PluginEntry) -> bool {
        if self.contains(&entry.id) {
            return false;
        }
        self.plugins.push(entry);
        true
    }

    /// Plugin ids in config order
    pub fn ids(&self) -> Vec<&str> {
        self.plugins.iter().map(|entry| entry.id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("ovm.json");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_requested() {
        let plain = PluginEntry::parse("calendar");
        assert_eq!(plain.id, "calendar");
        assert_eq!(plain.version(), "latest");

        let pinned = PluginEntry::parse("dataview@0.5.64");
        assert_eq!(pinned.id, "dataview");
        assert_eq!(pinned.version.as_deref(), Some("0.5.64"));

        let trailing = PluginEntry::parse("dataview@");
        assert_eq!(trailing.id, "dataview");
        assert!(trailing.version.is_none());
    }

    #[test]
    fn test_load_valid() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            &tmp,
            r#"{"plugins": [{"id": "p1"}, {"id": "p2", "version": "1.2.0"}]}"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.ids(), vec!["p1", "p2"]);
        assert_eq!(config.find("p2").unwrap().version(), "1.2.0");
        assert_eq!(config.find("p1").unwrap().version(), "latest");
    }

    #[test]
    fn test_load_missing_plugins_defaults_empty() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(&tmp, "{}");
        assert!(Config::load(&path).unwrap().plugins.is_empty());
    }

    #[test]
    fn test_load_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = Config::load(&tmp.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(&tmp, "{ not json");
        assert!(matches!(
            Config::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_load_wrong_shape() {
        let tmp = TempDir::new().unwrap();

        let path = write_file(&tmp, r#"{"plugins": "calendar"}"#);
        assert!(matches!(
            Config::load(&path).unwrap_err(),
            ConfigError::Validation { .. }
        ));

        let path = write_file(&tmp, r#"{"plugins": [{"id": 42}]}"#);
        assert!(matches!(
            Config::load(&path).unwrap_err(),
            ConfigError::Validation { .. }
        ));
    }

    #[test]
    fn test_load_empty_id() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(&tmp, r#"{"plugins": [{"id": ""}]}"#);
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_load_rejects_path_like_ids() {
        let tmp = TempDir::new().unwrap();
        for id in ["..", "../x", "a/b", ".", ".hidden"] {
            let content = serde_json::json!({"plugins": [{"id": id}]}).to_string();
            let path = write_file(&tmp, &content);
            let err = Config::load(&path).unwrap_err();
            assert!(matches!(err, ConfigError::Validation { .. }), "{id}");
            assert!(err.to_string().contains("invalid id"), "{id}");
        }
    }

    #[test]
    fn test_serialize_error_is_not_reported_as_parse() {
        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let err = ConfigError::Serialize {
            path: std::path::PathBuf::from("ovm.json"),
            source,
        };
        let message = err.to_string();
        assert!(message.starts_with("Failed to serialize config for ovm.json"));
    }

    #[test]
    fn test_load_duplicate_ids() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(&tmp, r#"{"plugins": [{"id": "a"}, {"id": "a"}]}"#);
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
        assert!(err.to_string().contains("duplicate id 'a'"));
    }

    #[test]
    fn test_round_trip_preserves_unknown_keys() {
        let tmp = TempDir::new().unwrap();
        let path = write_file(
            &tmp,
            r#"{"theme": {"name": "minimal"}, "plugins": [{"id": "a", "note": "keep"}], "alpha": 1}"#,
        );

        let config = Config::load(&path).unwrap();
        config.write(&path).unwrap();
        let reloaded = Config::load(&path).unwrap();

        assert_eq!(config, reloaded);
        assert_eq!(reloaded.extra["theme"]["name"], "minimal");
        assert_eq!(reloaded.plugins[0].extra["note"], "keep");
    }

    #[test]
    fn test_write_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ovm.json");
        let mut config = Config::default();
        config.add(PluginEntry::new("b", Some("1.0.0".into())));
        config.add(PluginEntry::new("a", None));

        config.write(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert_eq!(
            content,
            "{\n  \"plugins\": [\n    {\n      \"id\": \"b\",\n      \"version\": \"1.0.0\"\n    },\n    {\n      \"id\": \"a\"\n    }\n  ]\n}\n"
        );
    }

    #[test]
    fn test_create_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ovm.json");

        let config = Config::create_default(&path).unwrap();
        assert!(config.plugins.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"plugins\": []\n}\n");

        let err = Config::create_default(&path).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists { .. }));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut config = Config::default();
        assert!(config.add(PluginEntry::new("a", None)));
        assert!(!config.add(PluginEntry::new("a", Some("2.0.0".into()))));
        assert_eq!(config.plugins.len(), 1);
        assert!(config.find("a").unwrap().version.is_none());
    }
}
