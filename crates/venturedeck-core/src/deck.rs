//! Swipe card deck.
//!
//! Owns the ordered cards and a single [`SwipeGestureController`]. Only the
//! card at index 0 (the top) can start an interaction, so at most one card
//! is ever dragging. Releases are classified against [`SwipeThresholds`].

use std::collections::VecDeque;

use serde::Serialize;

use crate::gesture::{
    CardTransform, GestureEffect, GestureOutcome, PointerEvent, SwipeGestureController,
};
use crate::metrics::METRICS;
use crate::obs;

/// What a release means for the top card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDecision {
    /// Swiped right past the commit distance.
    Accept,
    /// Swiped left past the commit distance.
    Reject,
    /// Released short of the commit distance; the card returns to center.
    SnapBack,
}

impl SwipeDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDecision::Accept => "accept",
            SwipeDecision::Reject => "reject",
            SwipeDecision::SnapBack => "snap_back",
        }
    }
}

/// Horizontal distance a release must cover to commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeThresholds {
    pub commit_px: f64,
}

impl Default for SwipeThresholds {
    fn default() -> Self {
        Self { commit_px: 120.0 }
    }
}

impl SwipeThresholds {
    pub fn classify(&self, dx: f64, _dy: f64) -> SwipeDecision {
        if dx >= self.commit_px {
            SwipeDecision::Accept
        } else if dx <= -self.commit_px {
            SwipeDecision::Reject
        } else {
            SwipeDecision::SnapBack
        }
    }
}

/// Result of releasing or pressing a button on the top card.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeResolution<T> {
    pub decision: SwipeDecision,
    /// The card removed from the deck. `None` on snap-back.
    pub item: Option<T>,
    pub dx: f64,
    pub dy: f64,
}

/// Ordered deck of swipeable cards.
pub struct SwipeDeck<T> {
    cards: VecDeque<T>,
    controller: SwipeGestureController,
    thresholds: SwipeThresholds,
}

impl<T> SwipeDeck<T> {
    pub fn new(cards: impl IntoIterator<Item = T>) -> Self {
        Self::with_thresholds(cards, SwipeThresholds::default())
    }

    pub fn with_thresholds(
        cards: impl IntoIterator<Item = T>,
        thresholds: SwipeThresholds,
    ) -> Self {
        Self {
            cards: cards.into_iter().collect(),
            controller: SwipeGestureController::new(|dx, dy| {
                tracing::trace!(dx = dx, dy = dy, "top card released");
            }),
            thresholds,
        }
    }

    pub fn top(&self) -> Option<&T> {
        self.cards.front()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Cards from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.cards.iter()
    }

    pub fn thresholds(&self) -> SwipeThresholds {
        self.thresholds
    }

    pub fn controller(&self) -> &SwipeGestureController {
        &self.controller
    }

    /// Pointer-down on the card at `index` (0 = top).
    pub fn pointer_down(&mut self, index: usize, event: PointerEvent) -> bool {
        let is_top = index == 0 && !self.cards.is_empty();
        self.controller.begin(event, is_top)
    }

    pub fn pointer_move(&mut self, event: PointerEvent) -> GestureEffect {
        self.controller.on_move(event)
    }

    /// Pointer-up. `None` for taps and foreign pointers.
    pub fn pointer_up(&mut self, event: PointerEvent) -> Option<SwipeResolution<T>> {
        match self.controller.on_end(event) {
            GestureOutcome::Released { dx, dy } => Some(self.settle(dx, dy)),
            GestureOutcome::Tap => {
                METRICS.inc_taps_discarded();
                obs::emit_tap_discarded(event.pointer_id);
                None
            }
            GestureOutcome::Ignored => None,
        }
    }

    pub fn pointer_cancel(&mut self) -> GestureEffect {
        self.controller.cancel()
    }

    /// Render transform for the card at `index`; only the top card moves.
    pub fn transform_for(&self, index: usize) -> CardTransform {
        if index == 0 {
            self.controller.transform()
        } else {
            CardTransform::default()
        }
    }

    /// Accept button: commits the top card without a gesture.
    pub fn accept_top(&mut self) -> Option<SwipeResolution<T>> {
        self.commit_top(SwipeDecision::Accept, self.thresholds.commit_px)
    }

    /// Reject button: commits the top card without a gesture.
    pub fn reject_top(&mut self) -> Option<SwipeResolution<T>> {
        self.commit_top(SwipeDecision::Reject, -self.thresholds.commit_px)
    }

    fn commit_top(&mut self, decision: SwipeDecision, dx: f64) -> Option<SwipeResolution<T>> {
        if self.controller.listening() {
            return None;
        }
        let item = self.cards.pop_front()?;
        METRICS.inc_swipes_committed();
        obs::emit_swipe_committed(decision.as_str(), dx, 0.0);
        Some(SwipeResolution {
            decision,
            item: Some(item),
            dx,
            dy: 0.0,
        })
    }

    fn settle(&mut self, dx: f64, dy: f64) -> SwipeResolution<T> {
        let decision = self.thresholds.classify(dx, dy);
        let item = match decision {
            SwipeDecision::SnapBack => {
                obs::emit_swipe_snapped_back(dx, dy);
                None
            }
            SwipeDecision::Accept | SwipeDecision::Reject => {
                METRICS.inc_swipes_committed();
                obs::emit_swipe_committed(decision.as_str(), dx, dy);
                self.cards.pop_front()
            }
        };
        SwipeResolution {
            decision,
            item,
            dx,
            dy,
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SwipeDeck<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwipeDeck")
            .field("cards", &self.cards)
            .field("controller", &self.controller)
            .field("thresholds", &self.thresholds)
            .finish()
    }
}
