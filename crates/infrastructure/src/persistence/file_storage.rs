//! File-backed key/value storage.
//!
//! All keys live in one JSON document:
//! ```json
//! {
//!   "garage.session": "{\"accessToken\":\"...\",\"refreshToken\":\"...\"}"
//! }
//! ```
//! Keys are kept sorted and the file is replaced atomically (write to a
//! sibling temp file, then rename), so a crash never leaves half a document
//! behind.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use garage_application::{KeyValueStorage, StorageError};
use parking_lot::Mutex;

/// Storage persisting every key to a single JSON file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within the process.
    lock: Mutex<()>,
}

impl FileStorage {
    /// Creates a storage rooted at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Default location: `<config dir>/garage-console/session.json`.
    ///
    /// Returns `None` when the platform has no config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("garage-console").join("session.json"))
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }
        serde_json::from_slice(&content).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    fn write_document(&self, document: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut content = serde_json::to_vec_pretty(document)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        content.push(b'\n');

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _guard = self.lock.lock();
        let (mut document, corrupt) = match self.read_document() {
            Ok(document) => (document, false),
            Err(StorageError::Serialization(message)) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %message,
                    "storage file is corrupt, starting over"
                );
                (BTreeMap::new(), true)
            }
            Err(e) => return Err(e),
        };
        // A corrupt file is replaced even when the mutation changed nothing.
        if mutate(&mut document) || corrupt {
            self.write_document(&document)?;
        }
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read_document()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|document| {
            document.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|document| document.remove(key).is_some())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use garage_application::{CredentialStore, SESSION_KEY};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_remove() {
        let dir = tempdir().expect("Failed to create temp directory");
        let storage = FileStorage::new(dir.path().join("nested").join("storage.json"));

        assert_eq!(storage.get("garage.session").unwrap(), None);

        storage.set("garage.session", "{}").unwrap();
        storage.set("token", "legacy").unwrap();
        assert_eq!(storage.get("garage.session").unwrap(), Some("{}".to_string()));

        storage.remove("token").unwrap();
        assert_eq!(storage.get("token").unwrap(), None);
        assert_eq!(storage.get("garage.session").unwrap(), Some("{}".to_string()));
    }

    #[test]
    fn test_values_survive_new_instance() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("storage.json");

        FileStorage::new(&path).set("garage.session", "value").unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("garage.session").unwrap(), Some("value".to_string()));
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with('\n'));
        assert!(!dir.path().join("storage.json.tmp").exists());
    }

    #[test]
    fn test_remove_without_file_is_noop() {
        let dir = tempdir().expect("Failed to create temp directory");
        let storage = FileStorage::new(dir.path().join("storage.json"));

        storage.remove("garage.session").unwrap();

        assert!(!storage.path().exists());
    }

    #[test]
    fn test_corrupt_file_reports_error_then_recovers_on_write() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json").unwrap();
        let storage = FileStorage::new(&path);

        assert!(matches!(
            storage.get("garage.session"),
            Err(StorageError::Serialization(_))
        ));

        storage.set("garage.session", "fresh").unwrap();
        assert_eq!(storage.get("garage.session").unwrap(), Some("fresh".to_string()));
    }

    #[test]
    fn test_remove_rewrites_corrupt_file() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("storage.json");
        fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(&path);

        storage.remove("garage.session").unwrap();

        assert_eq!(storage.get("garage.session").unwrap(), None);
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
    }

    #[test]
    fn test_corrupt_session_file_is_purged_by_credential_store() {
        let dir = tempdir().expect("Failed to create temp directory");
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        let store = CredentialStore::new(Arc::new(FileStorage::new(&path)));

        assert_eq!(store.get(), None);
        let after_hydrate = FileStorage::new(&path);
        assert_eq!(after_hydrate.get(SESSION_KEY).unwrap(), None);

        store.clear();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<BTreeMap<String, String>>(&raw).is_ok());
    }
}
