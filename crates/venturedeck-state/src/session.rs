//! Role session store.
//!
//! Holds the active [`Role`] in memory and mirrors it to a single durable
//! key. Subscribers observe every change synchronously through a
//! `tokio::sync::watch` channel; no runtime is needed to send or read.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::kv::KvStore;
use crate::role::Role;
use crate::StateResult;

/// Durable key the active role is stored under.
pub const DEFAULT_ROLE_KEY: &str = "userRole";

/// The active role, persisted to a [`KvStore`].
///
/// Guarantees:
/// - `role()` is always one of the four enumerated values.
/// - A missing or corrupted persisted value reads as `Role::None`.
/// - After a successful `set_role`, every receiver sees the new value
///   before `set_role` returns.
pub struct RoleSessionStore {
    kv: Arc<dyn KvStore>,
    key: String,
    tx: watch::Sender<Role>,
}

impl RoleSessionStore {
    /// Open the store, loading the persisted role from `kv[key]`.
    ///
    /// Never fails: unreadable or invalid values fall back to `Role::None`.
    #[instrument(skip(kv, key), fields(key = %key.as_ref()))]
    pub fn open(kv: Arc<dyn KvStore>, key: impl AsRef<str>) -> Self {
        let key = key.as_ref().to_string();
        let initial = match kv.get(&key) {
            Ok(Some(raw)) => {
                let role = Role::from_persisted(&raw);
                if !role.is_selected() && raw != Role::None.as_str() {
                    warn!(value = %raw, "ignoring unrecognised persisted role");
                }
                role
            }
            Ok(None) => Role::None,
            Err(e) => {
                warn!(error = %e, "failed to read persisted role, defaulting to none");
                Role::None
            }
        };
        let (tx, _rx) = watch::channel(initial);
        Self { kv, key, tx }
    }

    /// Open the store under [`DEFAULT_ROLE_KEY`].
    pub fn with_default_key(kv: Arc<dyn KvStore>) -> Self {
        Self::open(kv, DEFAULT_ROLE_KEY)
    }

    /// The active role.
    pub fn role(&self) -> Role {
        *self.tx.borrow()
    }

    /// Durable key this store writes to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Set or clear the active role.
    ///
    /// `None` and `Some(Role::None)` both clear the persisted key. If the
    /// durable write fails the error is returned and the in-memory role is
    /// left untouched.
    pub fn set_role(&self, role: Option<Role>) -> StateResult<()> {
        let role = role.unwrap_or(Role::None);
        if role.is_selected() {
            self.kv.set(&self.key, role.as_str())?;
        } else {
            self.kv.remove(&self.key)?;
        }
        let previous = self.tx.send_replace(role);
        info!(event = "role.changed", from = %previous, to = %role);
        Ok(())
    }

    /// Clear persisted and in-memory state (logout, test isolation).
    pub fn reset(&self) -> StateResult<()> {
        self.set_role(None)
    }

    /// Receiver that observes every role change.
    pub fn subscribe(&self) -> watch::Receiver<Role> {
        self.tx.subscribe()
    }
}

impl std::fmt::Debug for RoleSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleSessionStore")
            .field("key", &self.key)
            .field("role", &self.role())
            .finish()
    }
}
