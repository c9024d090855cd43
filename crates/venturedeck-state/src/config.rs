//! Configuration for durable client state.

use std::path::PathBuf;

use crate::session::DEFAULT_ROLE_KEY;

/// Where and under which key client state is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateConfig {
    /// Directory backing the `FsKvStore` (default: ".venturedeck")
    pub state_dir: PathBuf,
    /// Durable key for the active role (default: "userRole")
    pub role_key: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(".venturedeck"),
            role_key: DEFAULT_ROLE_KEY.to_string(),
        }
    }
}

impl StateConfig {
    /// Set the state directory
    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    /// Set the role key
    pub fn with_role_key(mut self, key: impl Into<String>) -> Self {
        self.role_key = key.into();
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - VENTUREDECK_STATE_DIR (optional, default: ".venturedeck")
    /// - VENTUREDECK_ROLE_KEY (optional, default: "userRole")
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup("VENTUREDECK_STATE_DIR").filter(|v| !v.is_empty()) {
            config.state_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("VENTUREDECK_ROLE_KEY").filter(|v| !v.is_empty()) {
            config.role_key = key;
        }
        config
    }
}
