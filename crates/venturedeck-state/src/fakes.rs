//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryKvStore`, which satisfies the `KvStore` contract without
//! touching the filesystem, plus a `FailingKvStore` for exercising error paths.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::kv::KvStore;
use crate::{StateError, StateResult};

/// In-memory key-value store backed by a `HashMap<key, value>`.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-seeded with `(key, value)` pairs.
    pub fn seeded<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> StateResult<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StateResult<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StateResult<()> {
        self.values().remove(key);
        Ok(())
    }
}

/// Store whose every operation fails with an I/O error.
#[derive(Debug, Default)]
pub struct FailingKvStore;

impl FailingKvStore {
    fn error() -> StateError {
        StateError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "storage unavailable",
        ))
    }
}

impl KvStore for FailingKvStore {
    fn get(&self, _key: &str) -> StateResult<Option<String>> {
        Err(Self::error())
    }

    fn set(&self, _key: &str, _value: &str) -> StateResult<()> {
        Err(Self::error())
    }

    fn remove(&self, _key: &str) -> StateResult<()> {
        Err(Self::error())
    }
}
