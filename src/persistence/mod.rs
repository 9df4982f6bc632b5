//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope around every stored value
//! - Key/value stores: in-memory, or one JSON file per key in a directory
//! - Atomic file writes (tmp → rename)
//! - Corruption and version-mismatch detection via `StorageError`

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current envelope version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for {key:?}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed data stored under {key:?}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{key:?} was saved with version {found}, expected {expected}")]
    UnsupportedVersion { key: String, found: u32, expected: u32 },
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// Wrapper written around every stored value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: u32,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            version: SAVE_VERSION,
            data,
        }
    }
}

/// Raw string storage (LocalStorage-like)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Keys become file names, so keep them boring
fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Read and unwrap an envelope. `Ok(None)` when nothing is stored.
pub fn load_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(&raw).map_err(|source| StorageError::Json {
            key: key.to_string(),
            source,
        })?;
    if envelope.version != SAVE_VERSION {
        return Err(StorageError::UnsupportedVersion {
            key: key.to_string(),
            found: envelope.version,
            expected: SAVE_VERSION,
        });
    }
    let data = serde_json::from_value(envelope.data).map_err(|source| StorageError::Json {
        key: key.to_string(),
        source,
    })?;
    Ok(Some(data))
}

/// Wrap `value` in an envelope and store it
pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string_pretty(&Envelope::new(value)).map_err(|source| {
        StorageError::Json {
            key: key.to_string(),
            source,
        }
    })?;
    store.set(key, &json)
}

/// Volatile store for tests and the headless runner
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// The directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        log::debug!("wrote {}", path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        best: u64,
    }

    fn sample() -> Sample {
        Sample {
            name: "runner".into(),
            best: 1234,
        }
    }

    #[test]
    fn test_missing_key_loads_none() {
        let store = MemoryStore::new();
        let loaded: Option<Sample> = load_json(&store, "nothing").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_memory_store_keeps_values() {
        let mut store = MemoryStore::new();
        save_json(&mut store, "sample", &sample()).unwrap();
        assert_eq!(load_json::<Sample, _>(&store, "sample").unwrap(), Some(sample()));
        store.remove("sample").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.set("../escape", "{}"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_corrupt_data_is_a_json_error() {
        let mut store = MemoryStore::new();
        store.set("sample", "{not json").unwrap();
        let err = load_json::<Sample, _>(&store, "sample").unwrap_err();
        assert!(matches!(err, StorageError::Json { .. }));
    }

    #[test]
    fn test_future_version_is_rejected() {
        let mut store = MemoryStore::new();
        store
            .set("sample", r#"{"version": 99, "data": {"name": "x", "best": 1}}"#)
            .unwrap();
        let err = load_json::<Sample, _>(&store, "sample").unwrap_err();
        assert!(matches!(
            err,
            StorageError::UnsupportedVersion {
                found: 99,
                expected: SAVE_VERSION,
                ..
            }
        ));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("saves"));
        save_json(&mut store, "sample", &sample()).unwrap();
        assert!(dir.path().join("saves/sample.json").exists());
        assert!(!dir.path().join("saves/sample.json.tmp").exists());

        let reopened = JsonFileStore::new(dir.path().join("saves"));
        assert_eq!(
            load_json::<Sample, _>(&reopened, "sample").unwrap(),
            Some(sample())
        );
    }

    #[test]
    fn test_file_store_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path());
        store.remove("never_written").unwrap();
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_unreadable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be
        fs::create_dir(dir.path().join("blocked.json")).unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(store.get("blocked"), Err(StorageError::Io { .. })));
    }
}
