//! Structured observability hooks for VentureDeck client events.
//!
//! Events are emitted at `info!`/`debug!` level with an `event` field so
//! they can be filtered in aggregated logs (`RUST_LOG`, JSON output via
//! `--json`).

use tracing::{debug, info};

/// Span tagging everything a signed-in user's calls log.
///
/// Attach to futures with `tracing::Instrument::instrument`.
pub fn session_span(user_id: &str) -> tracing::Span {
    tracing::info_span!("venturedeck.session", user_id = %user_id)
}

/// Emit event: the route tree for `app` became active.
pub fn emit_route_tree_selected(role: &str, app: &str) {
    debug!(event = "router.tree_selected", role = %role, app = %app);
}

/// Emit event: a module request resolved to a role-specific file.
pub fn emit_module_resolved(app: &str, requested: &str, resolved: &std::path::Path) {
    debug!(
        event = "router.module_resolved",
        app = %app,
        requested = %requested,
        resolved = %resolved.display(),
    );
}

/// Emit event: a deck swipe was committed (accept or reject).
pub fn emit_swipe_committed(decision: &str, dx: f64, dy: f64) {
    info!(event = "deck.swipe_committed", decision = %decision, dx = dx, dy = dy);
}

/// Emit event: a drag was released short of the commit threshold.
pub fn emit_swipe_snapped_back(dx: f64, dy: f64) {
    debug!(event = "deck.snap_back", dx = dx, dy = dy);
}

/// Emit event: a pointer-up was classified as a tap.
pub fn emit_tap_discarded(pointer_id: u32) {
    debug!(event = "gesture.tap", pointer_id = pointer_id);
}

/// Emit event: the pending badge count was recomputed.
pub fn emit_pending_recomputed(user_id: &str, connections: u64, invitations: u64, total: u64) {
    info!(
        event = "pending.recomputed",
        user_id = %user_id,
        connections = connections,
        invitations = invitations,
        total = total,
    );
}

/// Emit event: pending recompute failed; the previous count is kept.
pub fn emit_pending_error(user_id: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "pending.error", user_id = %user_id, error = %error);
}
