//! On-disk cache for registry responses.
//!
//! Entries are plain files named by key. Freshness is judged by modification
//! time; only successful responses are ever written.

use crate::error::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Default time-to-live for cached registry responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// A directory of cached responses with a fixed TTL.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    ttl: Duration,
}

impl DiskCache {
    /// Create a cache rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// Cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Return the cached bytes for `key` if present and younger than the TTL.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.path(key);
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        let age = SystemTime::now().duration_since(modified).unwrap_or_default();
        if age >= self.ttl {
            log::debug!("Cache entry {} is stale ({}s old)", key, age.as_secs());
            return None;
        }
        fs::read(&path).ok()
    }

    /// Store `data` under `key`, replacing any previous entry atomically.
    pub fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        tmp.write_all(data).map_err(|e| Error::io(tmp.path(), e))?;

        let path = self.path(key);
        tmp.persist(&path).map_err(|e| Error::io(&path, e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_then_get() {
        let tmp = TempDir::new().unwrap();
        let cache = DiskCache::new(tmp.path().join("registry"), DEFAULT_TTL);

        cache.put("community-plugins.json", b"[]").unwrap();
        assert_eq!(cache.get("community-plugins.json"), Some(b"[]".to_vec()));
    }

    #[test]
    fn test_missing_entry() {
        let tmp = TempDir::new().unwrap();
        let cache = DiskCache::new(tmp.path(), DEFAULT_TTL);
        assert!(cache.get("community-plugins.json").is_none());
    }

    #[test]
    fn test_stale_entry_ignored() {
        let tmp = TempDir::new().unwrap();
        let cache = DiskCache::new(tmp.path(), Duration::ZERO);

        cache.put("community-plugins.json", b"[]").unwrap();
        assert!(cache.get("community-plugins.json").is_none());
    }

    #[test]
    fn test_put_overwrites() {
        let tmp = TempDir::new().unwrap();
        let cache = DiskCache::new(tmp.path(), DEFAULT_TTL);

        cache.put("key", b"old").unwrap();
        cache.put("key", b"new").unwrap();
        assert_eq!(cache.get("key"), Some(b"new".to_vec()));
    }
}
