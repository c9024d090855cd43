//! Global atomic counters for VentureDeck interaction events.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. when a page unmounts or the CLI exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Relaxed atomic counters.
pub struct Metrics {
    swipes_committed: AtomicU64,
    taps_discarded: AtomicU64,
    modules_resolved: AtomicU64,
    pending_recomputes: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            swipes_committed: AtomicU64::new(0),
            taps_discarded: AtomicU64::new(0),
            modules_resolved: AtomicU64::new(0),
            pending_recomputes: AtomicU64::new(0),
        }
    }

    /// A deck swipe crossed the commit threshold.
    pub fn inc_swipes_committed(&self) {
        self.swipes_committed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "swipes_committed", "counter incremented");
    }

    /// A pointer-up stayed under the drag threshold.
    pub fn inc_taps_discarded(&self) {
        self.taps_discarded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "taps_discarded", "counter incremented");
    }

    /// A role-specific module override was found.
    pub fn inc_modules_resolved(&self) {
        self.modules_resolved.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "modules_resolved", "counter incremented");
    }

    /// The pending badge count was recomputed.
    pub fn inc_pending_recomputes(&self) {
        self.pending_recomputes.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "pending_recomputes", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            swipes_committed = self.swipes_committed(),
            taps_discarded = self.taps_discarded(),
            modules_resolved = self.modules_resolved(),
            pending_recomputes = self.pending_recomputes(),
        );
    }

    pub fn swipes_committed(&self) -> u64 {
        self.swipes_committed.load(Ordering::Relaxed)
    }

    pub fn taps_discarded(&self) -> u64 {
        self.taps_discarded.load(Ordering::Relaxed)
    }

    pub fn modules_resolved(&self) -> u64 {
        self.modules_resolved.load(Ordering::Relaxed)
    }

    pub fn pending_recomputes(&self) -> u64 {
        self.pending_recomputes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_counters_increment() {
        let metrics = Metrics::new();
        metrics.inc_swipes_committed();
        metrics.inc_swipes_committed();
        metrics.inc_taps_discarded();

        assert_eq!(metrics.swipes_committed(), 2);
        assert_eq!(metrics.taps_discarded(), 1);
        assert_eq!(metrics.modules_resolved(), 0);
        metrics.flush();
    }
}
