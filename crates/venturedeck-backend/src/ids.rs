//! Record id generation.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Prefix shared by every generated startup id.
pub const ID_PREFIX: &str = "s_";

/// How new record ids are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdStrategy {
    /// `s_<uuid-v4>`
    #[default]
    Random,
    /// `s_<millis>_<seq>`; unique within one generator.
    Monotonic,
    /// `s_<millis>`; collides when two creates land in the same millisecond.
    LegacyTimestamp,
}

impl std::str::FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" | "uuid" => Ok(IdStrategy::Random),
            "monotonic" => Ok(IdStrategy::Monotonic),
            "legacy" | "legacy-timestamp" | "timestamp" => Ok(IdStrategy::LegacyTimestamp),
            other => Err(format!("unknown id strategy: {other}")),
        }
    }
}

/// Generates record ids according to an [`IdStrategy`].
#[derive(Debug)]
pub struct IdGenerator {
    strategy: IdStrategy,
    seq: AtomicU64,
}

impl IdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            seq: AtomicU64::new(0),
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Produce the next id.
    pub fn next_id(&self) -> String {
        match self.strategy {
            IdStrategy::Random => format!("{ID_PREFIX}{}", uuid::Uuid::new_v4()),
            IdStrategy::Monotonic => {
                let seq = self.seq.fetch_add(1, Ordering::SeqCst);
                format!("{ID_PREFIX}{}_{seq}", Utc::now().timestamp_millis())
            }
            IdStrategy::LegacyTimestamp => {
                format!("{ID_PREFIX}{}", Utc::now().timestamp_millis())
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}
