use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Flat persistent key/value store for generated descriptions.
///
/// The whole mapping lives in one JSON object file. Every `put` reads it, sets one key
/// and rewrites it through a temporary file. Unreadable or malformed content counts as
/// an empty cache. Entries never expire.
#[derive(Debug, Clone)]
pub struct DescriptionCache {
    path: PathBuf,
    enabled: bool,
}

impl DescriptionCache {
    pub fn new(path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            path: path.into(),
            enabled,
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(PathBuf::new(), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }
        self.load().remove(key)
    }

    /// Stores `value` under `key`. A no-op when the cache is disabled.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut entries = self.load();
        entries.insert(key.to_string(), value.to_string());
        self.atomic_write(&entries)?;

        debug!("Cached {} ({} entries)", key, entries.len());
        Ok(())
    }

    fn load(&self) -> BTreeMap<String, String> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(serde_json::Value::Object(map)) => map
                .into_iter()
                .filter_map(|(key, value)| match value {
                    serde_json::Value::String(s) => Some((key, s)),
                    _ => None,
                })
                .collect(),
            _ => {
                warn!(
                    "Ignoring unreadable description cache at {}",
                    self.path.display()
                );
                BTreeMap::new()
            }
        }
    }

    fn atomic_write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        let temp_path = self.path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(entries)?;
        fs::write(&temp_path, json)
            .with_context(|| format!("Failed to write cache file: {}", temp_path.display()))?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace cache file: {}", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DescriptionCache::new(temp_dir.path().join("nested/cache.json"), true);

        assert_eq!(cache.get("GET:api/users"), None);

        cache.put("GET:api/users", "Lists users.").unwrap();
        cache.put("POST:api/users", "Creates a user.").unwrap();

        assert_eq!(cache.get("GET:api/users").as_deref(), Some("Lists users."));
        assert_eq!(cache.get("POST:api/users").as_deref(), Some("Creates a user."));
        assert_eq!(cache.get("DELETE:api/users"), None);
    }

    #[test]
    fn test_put_overwrites_only_its_key() {
        let temp_dir = TempDir::new().unwrap();
        let cache = DescriptionCache::new(temp_dir.path().join("cache.json"), true);

        cache.put("a", "first").unwrap();
        cache.put("b", "other").unwrap();
        cache.put("a", "second").unwrap();

        assert_eq!(cache.get("a").as_deref(), Some("second"));
        assert_eq!(cache.get("b").as_deref(), Some("other"));

        let stored: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(cache.path()).unwrap()).unwrap();
        assert_eq!(stored, serde_json::json!({"a": "second", "b": "other"}));
    }

    #[test]
    fn test_entries_survive_a_new_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");

        DescriptionCache::new(&path, true).put("k", "v").unwrap();

        assert_eq!(DescriptionCache::new(&path, true).get("k").as_deref(), Some("v"));
        assert!(!temp_dir.path().join("cache.tmp").exists());
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        let cache = DescriptionCache::new(&path, false);

        cache.put("k", "v").unwrap();

        assert!(!cache.is_enabled());
        assert_eq!(cache.get("k"), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_store_counts_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let cache = DescriptionCache::new(&path, true);
        assert_eq!(cache.get("k"), None);

        cache.put("k", "v").unwrap();
        assert_eq!(cache.get("k").as_deref(), Some("v"));
    }
}
