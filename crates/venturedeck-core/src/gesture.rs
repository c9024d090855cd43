//! Per-card swipe gesture state machine.
//!
//! Translates raw pointer events on the topmost card into a committed
//! release `(dx, dy)` or a tap:
//!
//! ```text
//! Idle --begin(top card)--> Tracking --|d| >= 8px--> Dragging
//!   ^                          |                        |
//!   +------- on_end: Tap ------+                        |
//!   +------- on_end: Released(dx, dy) ------------------+
//! ```
//!
//! The caller owns listener lifecycle: attach window-level move/up
//! listeners after a successful [`SwipeGestureController::begin`] and detach
//! them as soon as [`SwipeGestureController::listening`] turns false, which
//! happens synchronously inside `on_end`/`cancel`. Pointer capture is only
//! requested at the Tracking -> Dragging transition, so taps never steal it
//! from child elements.
//!
//! Whether a release counts as accept, reject or snap-back is up to the
//! caller (see [`crate::deck`]); this controller only separates taps from
//! drags.

use serde::Serialize;

/// Movement (in either axis) that turns a press into a drag.
pub const DRAG_THRESHOLD_PX: f64 = 8.0;

/// `rotation_deg = offset_x / ROTATION_DIVISOR`.
pub const ROTATION_DIVISOR: f64 = 20.0;

/// Raw pointer sample in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: u32,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(pointer_id: u32, x: f64, y: f64) -> Self {
        Self { pointer_id, x, y }
    }
}

/// Where the controller is in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Idle,
    Tracking,
    Dragging,
}

/// Ephemeral per-card drag state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GestureState {
    pub offset_x: f64,
    pub offset_y: f64,
    pub rotation_deg: f64,
    pub dragging: bool,
}

/// What the renderer applies to the card.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CardTransform {
    pub x: f64,
    pub y: f64,
    pub rotation_deg: f64,
}

/// Side effect the caller must perform after `on_move`/`cancel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEffect {
    /// Event did not belong to the active interaction.
    Ignored,
    /// Still under the drag threshold.
    Pending,
    /// Drag started: capture this pointer.
    CapturePointer(u32),
    /// Offsets updated; re-render.
    Moved,
    /// Interaction aborted: release this previously captured pointer.
    ReleasePointer(u32),
    /// Interaction aborted before capture; nothing to release.
    Reset,
}

/// Result of a pointer-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    /// Event did not belong to the active interaction.
    Ignored,
    /// Movement stayed under the threshold; no callback was invoked.
    Tap,
    /// The release callback was invoked with this final delta.
    Released { dx: f64, dy: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Interaction {
    Idle,
    Tracking { pointer_id: u32, origin: (f64, f64) },
    Dragging { pointer_id: u32, origin: (f64, f64) },
}

/// Callback invoked with the final `(dx, dy)` of a drag.
pub type ReleaseCallback = Box<dyn FnMut(f64, f64) + Send>;

/// Drag-to-swipe controller for one card slot.
pub struct SwipeGestureController {
    interaction: Interaction,
    state: GestureState,
    on_release: ReleaseCallback,
}

impl SwipeGestureController {
    pub fn new(on_release: impl FnMut(f64, f64) + Send + 'static) -> Self {
        Self {
            interaction: Interaction::Idle,
            state: GestureState::default(),
            on_release: Box::new(on_release),
        }
    }

    /// Pointer-down. Starts tracking only on the top card while idle.
    /// Returns whether the caller should attach move/up listeners.
    pub fn begin(&mut self, event: PointerEvent, is_top_card: bool) -> bool {
        if !is_top_card || self.interaction != Interaction::Idle {
            return false;
        }
        self.interaction = Interaction::Tracking {
            pointer_id: event.pointer_id,
            origin: (event.x, event.y),
        };
        true
    }

    /// Pointer-move.
    pub fn on_move(&mut self, event: PointerEvent) -> GestureEffect {
        match self.interaction {
            Interaction::Idle => GestureEffect::Ignored,
            Interaction::Tracking { pointer_id, origin } => {
                if event.pointer_id != pointer_id {
                    return GestureEffect::Ignored;
                }
                let (dx, dy) = delta(origin, &event);
                if !exceeds_threshold(dx, dy) {
                    return GestureEffect::Pending;
                }
                self.interaction = Interaction::Dragging { pointer_id, origin };
                self.track(dx, dy);
                GestureEffect::CapturePointer(pointer_id)
            }
            Interaction::Dragging { pointer_id, origin } => {
                if event.pointer_id != pointer_id {
                    return GestureEffect::Ignored;
                }
                let (dx, dy) = delta(origin, &event);
                self.track(dx, dy);
                GestureEffect::Moved
            }
        }
    }

    /// Pointer-up. Invokes the release callback for drags, never for taps,
    /// and always returns to Idle.
    pub fn on_end(&mut self, event: PointerEvent) -> GestureOutcome {
        let (pointer_id, origin, dragging) = match self.interaction {
            Interaction::Idle => return GestureOutcome::Ignored,
            Interaction::Tracking { pointer_id, origin } => (pointer_id, origin, false),
            Interaction::Dragging { pointer_id, origin } => (pointer_id, origin, true),
        };
        if event.pointer_id != pointer_id {
            return GestureOutcome::Ignored;
        }

        let (dx, dy) = delta(origin, &event);
        self.reset();

        if dragging || exceeds_threshold(dx, dy) {
            (self.on_release)(dx, dy);
            GestureOutcome::Released { dx, dy }
        } else {
            GestureOutcome::Tap
        }
    }

    /// Pointer-cancel: abandon the interaction without a callback.
    pub fn cancel(&mut self) -> GestureEffect {
        let effect = match self.interaction {
            Interaction::Idle => GestureEffect::Ignored,
            Interaction::Tracking { .. } => GestureEffect::Reset,
            Interaction::Dragging { pointer_id, .. } => GestureEffect::ReleasePointer(pointer_id),
        };
        self.reset();
        effect
    }

    pub fn phase(&self) -> GesturePhase {
        match self.interaction {
            Interaction::Idle => GesturePhase::Idle,
            Interaction::Tracking { .. } => GesturePhase::Tracking,
            Interaction::Dragging { .. } => GesturePhase::Dragging,
        }
    }

    /// Whether window-level move/up listeners should be attached.
    pub fn listening(&self) -> bool {
        self.interaction != Interaction::Idle
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn transform(&self) -> CardTransform {
        CardTransform {
            x: self.state.offset_x,
            y: self.state.offset_y,
            rotation_deg: self.state.rotation_deg,
        }
    }

    fn track(&mut self, dx: f64, dy: f64) {
        self.state = GestureState {
            offset_x: dx,
            offset_y: dy,
            rotation_deg: dx / ROTATION_DIVISOR,
            dragging: true,
        };
    }

    fn reset(&mut self) {
        self.interaction = Interaction::Idle;
        self.state = GestureState::default();
    }
}

impl std::fmt::Debug for SwipeGestureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwipeGestureController")
            .field("phase", &self.phase())
            .field("state", &self.state)
            .finish()
    }
}

fn delta(origin: (f64, f64), event: &PointerEvent) -> (f64, f64) {
    (event.x - origin.0, event.y - origin.1)
}

fn exceeds_threshold(dx: f64, dy: f64) -> bool {
    dx.abs() >= DRAG_THRESHOLD_PX || dy.abs() >= DRAG_THRESHOLD_PX
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (SwipeGestureController, Arc<Mutex<Vec<(f64, f64)>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        let controller = SwipeGestureController::new(move |dx, dy| {
            sink.lock().unwrap().push((dx, dy));
        });
        (controller, calls)
    }

    #[test]
    fn test_begin_only_on_top_card() {
        let (mut controller, _) = recording();
        assert!(!controller.begin(PointerEvent::new(1, 0.0, 0.0), false));
        assert_eq!(controller.phase(), GesturePhase::Idle);

        assert!(controller.begin(PointerEvent::new(1, 0.0, 0.0), true));
        assert_eq!(controller.phase(), GesturePhase::Tracking);
    }

    #[test]
    fn test_second_pointer_cannot_begin_while_tracking() {
        let (mut controller, _) = recording();
        controller.begin(PointerEvent::new(1, 0.0, 0.0), true);
        assert!(!controller.begin(PointerEvent::new(2, 5.0, 5.0), true));
    }

    #[test]
    fn test_capture_requested_exactly_at_threshold() {
        let (mut controller, _) = recording();
        controller.begin(PointerEvent::new(7, 10.0, 10.0), true);

        assert_eq!(
            controller.on_move(PointerEvent::new(7, 17.9, 10.0)),
            GestureEffect::Pending
        );
        assert_eq!(
            controller.on_move(PointerEvent::new(7, 10.0, 18.0)),
            GestureEffect::CapturePointer(7)
        );
        assert_eq!(
            controller.on_move(PointerEvent::new(7, 40.0, 18.0)),
            GestureEffect::Moved
        );
    }

    #[test]
    fn test_other_pointer_ids_ignored() {
        let (mut controller, calls) = recording();
        controller.begin(PointerEvent::new(1, 0.0, 0.0), true);

        assert_eq!(
            controller.on_move(PointerEvent::new(2, 100.0, 0.0)),
            GestureEffect::Ignored
        );
        assert_eq!(
            controller.on_end(PointerEvent::new(2, 100.0, 0.0)),
            GestureOutcome::Ignored
        );
        assert!(controller.listening());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_after_capture_releases_pointer() {
        let (mut controller, calls) = recording();
        controller.begin(PointerEvent::new(3, 0.0, 0.0), true);
        controller.on_move(PointerEvent::new(3, 50.0, 0.0));

        assert_eq!(controller.cancel(), GestureEffect::ReleasePointer(3));
        assert_eq!(controller.state(), GestureState::default());
        assert!(!controller.listening());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_while_tracking_resets() {
        let (mut controller, _) = recording();
        controller.begin(PointerEvent::new(3, 0.0, 0.0), true);
        assert_eq!(controller.cancel(), GestureEffect::Reset);
        assert_eq!(controller.cancel(), GestureEffect::Ignored);
    }

    #[test]
    fn test_rotation_is_unclamped() {
        let (mut controller, _) = recording();
        controller.begin(PointerEvent::new(1, 0.0, 0.0), true);
        controller.on_move(PointerEvent::new(1, -2000.0, 0.0));
        assert_eq!(controller.transform().rotation_deg, -100.0);
    }
}
