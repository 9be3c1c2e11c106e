//! Column store persisted to a single JSON object on disk.
//!
//! Loads entirely into memory on open; `flush` writes only when dirty,
//! via a temp file and rename so a crash never leaves a half-written file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{validate_key, ColumnStore, StoreResult};

pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    ///
    /// Fails with [`StoreError::InvalidKey`](crate::StoreError::InvalidKey)
    /// if the file holds a key outside the allowed character set.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let entries: BTreeMap<String, String> = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };

        // A hand-edited file could hold keys that `get` would never accept.
        for key in entries.keys() {
            validate_key(key)?;
        }

        tracing::debug!(path = %path.display(), entries = entries.len(), "opened store");

        Ok(JsonFileStore {
            path: path.to_path_buf(),
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Flush dirty changes to disk using an atomic write (write then rename).
    pub fn flush(&mut self) -> StoreResult<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.entries)?;

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        self.dirty = false;
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "store flushed");
        Ok(())
    }
}

impl ColumnStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: String) -> StoreResult<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.dirty = true;
        }
        Ok(removed)
    }
}

impl Drop for JsonFileStore {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.flush() {
                tracing::warn!(path = %self.path.display(), "failed to flush store on drop: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(&dir.path().join("store.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_flush_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.put("users.1:email", "ENVELOPE".into()).unwrap();
        store.flush().unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("users.1:email").unwrap().as_deref(), Some("ENVELOPE"));
        assert_eq!(reopened.keys().collect::<Vec<_>>(), vec!["users.1:email"]);
    }

    #[test]
    fn test_drop_flushes_dirty_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.put("a", "1".into()).unwrap();
        }
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_remove_marks_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.put("a", "1".into()).unwrap();
        store.flush().unwrap();
        assert!(store.remove("a").unwrap());
        store.flush().unwrap();

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_key_in_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"ok.key": "v", "bad key": "v"}"#).unwrap();

        match JsonFileStore::open(&path) {
            Err(StoreError::InvalidKey(key)) => assert_eq!(key, "bad key"),
            other => panic!("expected invalid key, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Corrupt(_))));
    }
}
