//! # File Store
//!
//! Key-value store kept in one JSON snapshot file, rewritten on every
//! change. This is the host's stand-in for the browser's origin storage.

use services_persistence::persistence::{deserialize_store, load_store_safe, serialize_store};
use services_persistence::{KeyValueStore, MemoryStore, PersistenceError, PersistenceResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Store file is corrupt: {0}")]
    Corrupt(String),
}

impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

/// Store backed by a snapshot file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    items: MemoryStore,
}

impl FileStore {
    /// Opens the store at `path`
    ///
    /// A missing file is an empty store; a corrupt one is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read(&path) {
            Ok(bytes) => MemoryStore::from_snapshot(deserialize_store(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => MemoryStore::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, items })
    }

    /// Opens the store at `path`, starting empty if the file is corrupt
    pub fn open_or_reset(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read(&path) {
            Ok(bytes) => MemoryStore::from_snapshot(load_store_safe(&bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => MemoryStore::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_items(&self, items: &MemoryStore) -> PersistenceResult<()> {
        let bytes = serialize_store(&items.to_snapshot())?;
        fs::write(&self.path, bytes).map_err(|e| PersistenceError::StoreUnavailable(e.to_string()))
    }

    /// Applies `change` to a copy and keeps it only once the file is written
    fn commit<F>(&mut self, change: F) -> PersistenceResult<()>
    where
        F: FnOnce(&mut MemoryStore) -> PersistenceResult<()>,
    {
        let mut next = self.items.clone();
        change(&mut next)?;
        self.write_items(&next)?;
        self.items = next;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        self.commit(|items| items.set_item(key, value))
    }

    fn remove_item(&mut self, key: &str) -> PersistenceResult<()> {
        self.commit(|items| items.remove_item(key))
    }
}

/// Store picked at startup: a file when a path is given, memory otherwise
#[derive(Debug)]
pub enum HostStore {
    Memory(MemoryStore),
    File(FileStore),
}

impl KeyValueStore for HostStore {
    fn get_item(&self, key: &str) -> Option<String> {
        match self {
            HostStore::Memory(store) => store.get_item(key),
            HostStore::File(store) => store.get_item(key),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> PersistenceResult<()> {
        match self {
            HostStore::Memory(store) => store.set_item(key, value),
            HostStore::File(store) => store.set_item(key, value),
        }
    }

    fn remove_item(&mut self, key: &str) -> PersistenceResult<()> {
        match self {
            HostStore::Memory(store) => store.remove_item(key),
            HostStore::File(store) => store.remove_item(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("store.json")).unwrap();
        assert_eq!(store.get_item("program"), None);
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set_item("program", "long a;\nlong b;").unwrap();
        store.set_item("nostalgic", "true").unwrap();
        store.remove_item("nostalgic").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("program").as_deref(), Some("long a;\nlong b;"));
        assert_eq!(reopened.get_item("nostalgic"), None);
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Corrupt(_))));

        let store = FileStore::open_or_reset(&path).unwrap();
        assert_eq!(store.get_item("program"), None);
    }

    #[test]
    fn test_unwritable_location_reports_store_error() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::open(dir.path().join("missing").join("store.json")).unwrap();

        let result = store.set_item("program", "x");
        assert!(matches!(result, Err(PersistenceError::StoreUnavailable(_))));
    }

    #[test]
    fn test_failed_write_keeps_previous_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let mut store = FileStore::open(&path).unwrap();
        store.set_item("program", "old").unwrap();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let result = store.set_item("program", "new");
        assert!(matches!(result, Err(PersistenceError::StoreUnavailable(_))));
        assert_eq!(store.get_item("program").as_deref(), Some("old"));

        assert!(store.remove_item("program").is_err());
        assert_eq!(store.get_item("program").as_deref(), Some("old"));
    }

    #[test]
    fn test_host_store_dispatch() {
        let mut store = HostStore::Memory(MemoryStore::new());
        store.set_item("program", "x").unwrap();
        assert_eq!(store.get_item("program").as_deref(), Some("x"));
    }
}
