//! Bottom-navigation visibility.
//!
//! A single boolean, visible by default. Full-bleed flows (swipe decks,
//! full-screen modals) hide it while they are open. Last writer wins.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Shared handle to the navigation chrome flag. Clones share state.
#[derive(Clone)]
pub struct NavigationVisibility {
    tx: Arc<watch::Sender<bool>>,
}

impl NavigationVisibility {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn hide(&self) {
        self.set_visible(false);
    }

    pub fn show(&self) {
        self.set_visible(true);
    }

    /// Overwrite the flag. Redundant writes are allowed and still notify.
    pub fn set_visible(&self, visible: bool) {
        self.tx.send_replace(visible);
        debug!(event = "nav.visibility", visible = visible);
    }

    /// Hide the nav until the returned guard is dropped.
    pub fn hide_scoped(&self) -> HideGuard {
        self.hide();
        HideGuard { nav: self.clone() }
    }

    /// Receiver that observes every visibility write.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for NavigationVisibility {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NavigationVisibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationVisibility")
            .field("visible", &self.is_visible())
            .finish()
    }
}

/// Restores navigation visibility on drop.
#[must_use = "the nav is shown again as soon as the guard is dropped"]
pub struct HideGuard {
    nav: NavigationVisibility,
}

impl Drop for HideGuard {
    fn drop(&mut self) {
        self.nav.show();
    }
}
