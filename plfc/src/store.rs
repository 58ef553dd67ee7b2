//! Small string key-value store standing in for the browser's local storage.

use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

pub const STORE_FILENAME: &str = "storage.json";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Error while reading store file: {0}")]
    ReadingFile(String),
    #[error("Error while writing store file: {0}")]
    WritingFile(String),
    #[error("Failed to serialize value: {0}")]
    Serialization(String),
}

/// Persistent storage for the registration records.
///
/// Implementations must be usable from any task, reads and writes are synchronous.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock leaves the map itself consistent.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-local store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.values).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.values).get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        lock(&self.values).insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.values).remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            guard: Mutex::new(()),
        }
    }

    /// Store living in `storage.json` under the given directory.
    pub fn in_directory(dir: &Path) -> Self {
        let mut path = dir.to_path_buf();
        path.push(STORE_FILENAME);
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StoreError::ReadingFile(format!(
                    "Reading {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_slice::<BTreeMap<String, String>>(&content) {
            Ok(values) => Ok(values),
            Err(e) => {
                tracing::warn!("Something wrong with store file {}: {}", self.path.display(), e);
                tracing::warn!("Store file is reset");
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(values)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::WritingFile(format!("Creating directory: {}", e)))?;
        }

        let mut tmp = self.path.clone();
        tmp.set_extension("json.tmp");
        std::fs::write(&tmp, &content)
            .map_err(|e| StoreError::WritingFile(format!("Writing temporary file: {}", e)))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::WritingFile(format!("Replacing store file: {}", e)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = lock(&self.guard);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let _guard = lock(&self.guard);
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value);
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = lock(&self.guard);
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1".to_string()).unwrap();
        store.set("k", "v2".to_string()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        store.remove("missing").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_directory(dir.path());
        assert_eq!(store.get("plfc_registration").unwrap(), None);

        store
            .set("plfc_registration", "{\"teamName\":\"Eagles\"}".to_string())
            .unwrap();
        store.set("other", "x".to_string()).unwrap();

        let reopened = FileStore::in_directory(dir.path());
        assert_eq!(
            reopened.get("plfc_registration").unwrap().as_deref(),
            Some("{\"teamName\":\"Eagles\"}")
        );

        reopened.remove("other").unwrap();
        assert_eq!(store.get("other").unwrap(), None);
        assert!(store.get("plfc_registration").unwrap().is_some());
    }

    #[test]
    fn file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut nested = dir.path().to_path_buf();
        nested.push("a");
        nested.push("b");
        let store = FileStore::in_directory(&nested);
        store.set("k", "v".to_string()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn corrupted_file_store_is_reset() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_directory(dir.path());
        std::fs::write(store.path(), b"not json").unwrap();

        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v".to_string()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
