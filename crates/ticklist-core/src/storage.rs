//! Durable key-value mirror of session state
//!
//! Each collection is stored as one JSON payload under a fixed key. Reads
//! are forgiving (anything unreadable is treated as absent); writes report
//! failure so callers can warn that a change may not survive a restart.

use crate::error::StorageError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

const SENTINEL_KEY: &str = "__storage_test__";

/// Persisted key namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    User,
    Lists,
    Items,
    Settings,
    View,
    FocusedList,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::User,
        StorageKey::Lists,
        StorageKey::Items,
        StorageKey::Settings,
        StorageKey::View,
        StorageKey::FocusedList,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::User => "todo_user",
            StorageKey::Lists => "todo_lists",
            StorageKey::Items => "todo_items",
            StorageKey::Settings => "todo_settings",
            StorageKey::View => "todo_view",
            StorageKey::FocusedList => "todo_focused_list",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw string storage medium
pub trait StorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-process backend
///
/// Can be switched unavailable to behave like a disabled or full medium.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
    unavailable: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_available(&mut self, available: bool) {
        self.unavailable = !available;
    }

    /// Raw payload for a key, bypassing availability
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Overwrite a raw payload, bypassing availability
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable {
            Err(StorageError::Unavailable("memory backend disabled".into()))
        } else {
            Ok(())
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if needed) a data directory
    pub fn open(dir: impl Into<PathBuf>) -> crate::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn io_err(key: &str, source: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_string(),
            source,
        }
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(key, e)),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // Write to a sibling temp file, then rename over the target
        let path = self.path(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        let mut file = fs::File::create(&tmp).map_err(|e| Self::io_err(key, e))?;
        if let Err(e) = file.write_all(value.as_bytes()).and_then(|_| file.sync_all()) {
            let _ = fs::remove_file(&tmp);
            return Err(Self::io_err(key, e));
        }
        drop(file);
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(Self::io_err(key, e));
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(key, e)),
        }
    }
}

/// Typed JSON layer over a [`StorageBackend`]
#[derive(Debug)]
pub struct DurableStore<B> {
    backend: B,
}

impl<B: StorageBackend> DurableStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Read and decode a collection
    ///
    /// Backend failures and malformed payloads both yield `None`.
    pub fn get<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = match self.backend.read(key.as_str()) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key = %key, error = %e, "read failed, treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "malformed payload, treating as absent");
                None
            }
        }
    }

    /// Encode and write a collection
    pub fn set<T: Serialize + ?Sized>(&mut self, key: StorageKey, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.backend.write(key.as_str(), &raw)
    }

    pub fn remove(&mut self, key: StorageKey) -> Result<(), StorageError> {
        self.backend.remove(key.as_str())
    }

    /// Write `value`, or remove the key when `None`
    pub fn set_or_remove<T: Serialize>(
        &mut self,
        key: StorageKey,
        value: Option<&T>,
    ) -> Result<(), StorageError> {
        match value {
            Some(v) => self.set(key, v),
            None => self.remove(key),
        }
    }

    /// Remove every key in the namespace
    ///
    /// Attempts all keys and returns the first failure.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in StorageKey::ALL {
            if let Err(e) = self.remove(key)
                && first_err.is_none()
            {
                first_err = Some(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Probe the medium by writing and removing a sentinel key
    pub fn is_available(&mut self) -> bool {
        self.backend
            .write(SENTINEL_KEY, SENTINEL_KEY)
            .and_then(|_| self.backend.remove(SENTINEL_KEY))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::Settings;

    #[test]
    fn test_missing_key_is_absent() {
        let store = DurableStore::new(MemoryBackend::new());
        assert_eq!(store.get::<Vec<String>>(StorageKey::Lists), None);
    }

    #[test]
    fn test_malformed_payload_is_absent() {
        let mut backend = MemoryBackend::new();
        backend.insert_raw("todo_settings", "{not json");
        let store = DurableStore::new(backend);
        assert_eq!(store.get::<Settings>(StorageKey::Settings), None);
    }

    #[test]
    fn test_unavailable_backend() {
        let mut store = DurableStore::new(MemoryBackend::new());
        store.set(StorageKey::View, "focus").unwrap();
        store.backend_mut().set_available(false);

        assert!(!store.is_available());
        assert_eq!(store.get::<String>(StorageKey::View), None);
        assert!(matches!(
            store.set(StorageKey::View, "all"),
            Err(StorageError::Unavailable(_))
        ));
        // Existing payload untouched
        assert_eq!(store.backend().raw("todo_view"), Some("\"focus\""));
    }

    #[test]
    fn test_probe_leaves_no_sentinel() {
        let mut store = DurableStore::new(MemoryBackend::new());
        assert!(store.is_available());
        assert_eq!(store.backend().raw(SENTINEL_KEY), None);
    }

    #[test]
    fn test_clear_removes_namespace() {
        let mut store = DurableStore::new(MemoryBackend::new());
        store.set(StorageKey::Lists, &Vec::<u8>::new()).unwrap();
        store.set(StorageKey::FocusedList, "list-1").unwrap();
        store.backend_mut().insert_raw("unrelated", "1");

        store.clear().unwrap();

        assert_eq!(store.backend().raw("todo_lists"), None);
        assert_eq!(store.backend().raw("todo_focused_list"), None);
        assert_eq!(store.backend().raw("unrelated"), Some("1"));
    }

    #[test]
    fn test_file_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DurableStore::new(FileBackend::open(dir.path()).unwrap());

        store.set(StorageKey::FocusedList, "list-abc").unwrap();
        assert_eq!(
            store.get::<String>(StorageKey::FocusedList).as_deref(),
            Some("list-abc")
        );
        assert!(dir.path().join("todo_focused_list.json").exists());

        store.set_or_remove::<String>(StorageKey::FocusedList, None).unwrap();
        assert_eq!(store.get::<String>(StorageKey::FocusedList), None);
        // Removing twice is fine
        store.remove(StorageKey::FocusedList).unwrap();
        assert!(store.is_available());
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileBackend::open(dir.path()).unwrap();
        // A non-empty directory in place of the target makes the rename fail
        let target = dir.path().join("todo_view.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("blocker"), "x").unwrap();

        let err = backend.write("todo_view", "\"all\"").unwrap_err();
        assert!(matches!(err, StorageError::Io { ref key, .. } if key == "todo_view"));
        assert!(!dir.path().join(".todo_view.json.tmp").exists());
    }
}
