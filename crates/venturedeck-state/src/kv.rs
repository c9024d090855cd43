//! Durable key-value storage seam.
//!
//! The front-ends persist a handful of string values (the active role) in
//! browser-style local storage. `KvStore` abstracts that so the session
//! store can run against a directory on disk or against the in-memory fake
//! in [`crate::fakes`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StateError;
use crate::StateResult;

/// Synchronous string key-value store.
///
/// Guarantees:
/// - `get` after `set(key, v)` returns `Some(v)`.
/// - `get` after `remove(key)` returns `None`.
/// - `remove` of an absent key is a no-op.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> StateResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StateResult<()>;

    /// Remove `key`. No-op if absent.
    fn remove(&self, key: &str) -> StateResult<()>;
}

/// Filesystem-backed key-value store: one file per key.
///
/// Layout: `<root>/<key>`
pub struct FsKvStore {
    root: PathBuf,
}

impl FsKvStore {
    /// Create a store rooted at `root`. Creates the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> StateResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the key files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> StateResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StateError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(key))
    }
}

impl KvStore for FsKvStore {
    fn get(&self, key: &str) -> StateResult<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StateError::InvalidValue {
                    key: key.to_string(),
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StateError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> StateResult<()> {
        let path = self.key_path(key)?;

        // Atomic write: temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(key = %key, path = %path.display(), "kv value written");
        Ok(())
    }

    fn remove(&self, key: &str) -> StateResult<()> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, FsKvStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsKvStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn value_roundtrip() {
        let (_dir, store) = make_store();
        store.set("userRole", "creator").unwrap();
        assert_eq!(store.get("userRole").unwrap().as_deref(), Some("creator"));
    }

    #[test]
    fn overwrite_replaces_value() {
        let (dir, store) = make_store();
        store.set("userRole", "creator").unwrap();
        store.set("userRole", "investor").unwrap();
        assert_eq!(store.get("userRole").unwrap().as_deref(), Some("investor"));

        // No temp files left behind.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn missing_key_is_none() {
        let (_dir, store) = make_store();
        assert_eq!(store.get("userRole").unwrap(), None);
    }

    #[test]
    fn remove_absent_key_is_noop() {
        let (_dir, store) = make_store();
        store.remove("userRole").unwrap();
        store.set("userRole", "innovator").unwrap();
        store.remove("userRole").unwrap();
        assert_eq!(store.get("userRole").unwrap(), None);
    }

    #[test]
    fn path_traversal_key_rejected() {
        let (_dir, store) = make_store();
        let err = store.set("../outside", "x").unwrap_err();
        assert!(matches!(err, StateError::InvalidKey { .. }));
        assert!(store.get("").is_err());
    }

    #[test]
    fn non_utf8_value_is_invalid() {
        let (dir, store) = make_store();
        std::fs::write(dir.path().join("userRole"), [0xff, 0xfe]).unwrap();
        let err = store.get("userRole").unwrap_err();
        assert!(matches!(err, StateError::InvalidValue { .. }));
    }
}
