//! Persistence - scoped key-value storage for sessions, archives and edits.
//!
//! Values are JSON documents under string keys. Reads never fail: a missing
//! key or a value that does not decode is treated as empty and logged.

mod directory;

pub use directory::*;

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// A synchronous string key-value store.
pub trait KeyValueStore {
    /// Get the raw value under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store, mainly for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Directory-backed store with one file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding `key`. Bytes outside `[A-Za-z0-9._-]` are written as
    /// `%XX`, so distinct keys never share a file.
    fn path_for(&self, key: &str) -> PathBuf {
        let mut file = String::with_capacity(key.len() + 5);
        for b in key.bytes() {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.') {
                file.push(char::from(b));
            } else {
                let _ = write!(file, "%{b:02X}");
            }
        }
        file.push_str(".json");
        self.root.join(file)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read stored value: {e}");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let write = || -> std::io::Result<()> {
            fs::create_dir_all(&self.root)?;
            fs::write(self.path_for(key), value)
        };
        write().map_err(|source| StorageError::Write {
            key: key.to_string(),
            source,
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Read and decode a JSON value, substituting the default when the key is
/// missing or the stored text is corrupt.
pub fn read_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let Some(text) = store.get(key) else {
        return T::default();
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, "discarding corrupt stored value: {e}");
            T::default()
        }
    }
}

/// Encode and store a JSON value.
pub fn write_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let text = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_read_json_defaults_on_corruption() {
        let mut store = MemoryStore::new();
        store.set("list", "{not json").unwrap();

        let list: Vec<String> = read_json(&store, "list");
        assert!(list.is_empty());

        let missing: Vec<String> = read_json(&store, "missing");
        assert!(missing.is_empty());
    }

    #[test]
    fn test_write_then_read_json() {
        let mut store = MemoryStore::new();
        write_json(&mut store, "names", &vec!["Ava", "Rook"]).unwrap();
        let names: Vec<String> = read_json(&store, "names");
        assert_eq!(names, vec!["Ava", "Rook"]);
    }

    #[test]
    fn test_file_store() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path().join("journal"));

        assert!(store.get("ds_sessions").is_none());
        store.set("ds_sessions", "[]").unwrap();
        assert_eq!(store.get("ds_sessions").as_deref(), Some("[]"));

        // Keys with path separators stay inside the root.
        store.set("../escape/key", "x").unwrap();
        assert_eq!(store.get("../escape/key").as_deref(), Some("x"));
        assert!(!dir.path().join("escape").exists());

        store.remove("ds_sessions").unwrap();
        assert!(store.get("ds_sessions").is_none());
        store.remove("ds_sessions").unwrap();
    }

    #[test]
    fn test_file_store_keys_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let mut store = FileStore::new(dir.path());

        let keys = ["a/b", "a_b", "a%2Fb", "a b", "ключ"];
        for (i, key) in keys.iter().enumerate() {
            store.set(key, &i.to_string()).unwrap();
        }
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(store.get(key), Some(i.to_string()));
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), keys.len());

        store.remove("a/b").unwrap();
        assert!(store.get("a/b").is_none());
        assert_eq!(store.get("a_b").as_deref(), Some("1"));
    }
}
