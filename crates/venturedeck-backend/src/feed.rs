//! Realtime change feeds.
//!
//! A change feed is an opaque push capability: `subscribe(topic)` returns a
//! subscription that yields [`ChangeEvent`]s until it is unsubscribed or the
//! topic closes. `MemoryChangeFeed` implements it over
//! `tokio::sync::broadcast`, one channel per topic.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Topic carrying connection-request changes.
pub const CONNECTION_REQUESTS: &str = "connection_requests";

/// Topic carrying team-invitation changes.
pub const TEAM_INVITATIONS: &str = "team_invitations";

const DEFAULT_CAPACITY: usize = 64;

/// Kind of row change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A single change notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub topic: String,
    pub kind: ChangeKind,
    pub record_id: Option<String>,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(topic: impl Into<String>, kind: ChangeKind, record_id: Option<String>) -> Self {
        Self {
            topic: topic.into(),
            kind,
            record_id,
            at: Utc::now(),
        }
    }
}

/// Live subscription to one topic.
#[derive(Debug)]
pub struct FeedSubscription {
    topic: String,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl FeedSubscription {
    pub fn new(topic: impl Into<String>, rx: broadcast::Receiver<ChangeEvent>) -> Self {
        Self {
            topic: topic.into(),
            rx,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Next event, or `None` once the topic is closed.
    ///
    /// A subscriber that falls behind skips the dropped events and keeps
    /// receiving; derived values are recomputed from source, not from the
    /// events themselves.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(topic = %self.topic, skipped = skipped, "change feed lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Stop receiving events.
    pub fn unsubscribe(self) {
        debug!(topic = %self.topic, "change feed unsubscribed");
    }
}

/// Push-notification capability keyed by topic.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, topic: &str) -> FeedSubscription;

    /// Deliver `event` to current subscribers of `event.topic`. Returns the
    /// number of subscribers reached.
    fn publish(&self, event: ChangeEvent) -> usize;
}

/// In-process change feed.
#[derive(Debug)]
pub struct MemoryChangeFeed {
    topics: Mutex<HashMap<String, broadcast::Sender<ChangeEvent>>>,
    capacity: usize,
}

impl MemoryChangeFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Per-topic buffer size before slow subscribers start lagging.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Close `topic`. Subscribers drain buffered events, then see `None`.
    pub fn close(&self, topic: &str) {
        self.topics().remove(topic);
    }

    fn topics(&self) -> std::sync::MutexGuard<'_, HashMap<String, broadcast::Sender<ChangeEvent>>> {
        self.topics.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed for MemoryChangeFeed {
    fn subscribe(&self, topic: &str) -> FeedSubscription {
        let capacity = self.capacity;
        let rx = self
            .topics()
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(capacity).0)
            .subscribe();
        FeedSubscription::new(topic, rx)
    }

    fn publish(&self, event: ChangeEvent) -> usize {
        let topics = self.topics();
        match topics.get(&event.topic) {
            // send only fails when nobody is listening
            Some(tx) => tx.send(event).unwrap_or(0),
            None => 0,
        }
    }
}
