//! Mock backend configuration.

use std::time::Duration;

use crate::error::BackendError;
use crate::ids::IdStrategy;
use crate::BackendResult;

/// Default simulated round-trip latency.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(200);

/// Configuration for [`crate::MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Simulated latency applied before every async call resolves (default: 200ms)
    pub latency: Duration,
    /// Id generation strategy for `create` (default: random)
    pub id_strategy: IdStrategy,
    /// Whether to preload the demo startups (default: false)
    pub seed_demo_data: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            id_strategy: IdStrategy::default(),
            seed_demo_data: false,
        }
    }
}

impl BackendConfig {
    /// Zero-latency configuration, handy for tests that do not pause time.
    pub fn instant() -> Self {
        Self::default().with_latency(Duration::ZERO)
    }

    /// Set simulated latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Set id strategy
    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    /// Set whether demo data is preloaded
    pub fn with_seed(mut self, seed: bool) -> Self {
        self.seed_demo_data = seed;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - VENTUREDECK_MOCK_LATENCY_MS (optional, default: 200)
    /// - VENTUREDECK_ID_STRATEGY (optional, default: "random"; also "monotonic", "legacy")
    /// - VENTUREDECK_SEED (optional, default: "false") - set to "true" to preload demo data
    pub fn from_env() -> BackendResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> BackendResult<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("VENTUREDECK_MOCK_LATENCY_MS") {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                BackendError::Config(format!("VENTUREDECK_MOCK_LATENCY_MS is not a number: {raw}"))
            })?;
            config.latency = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("VENTUREDECK_ID_STRATEGY") {
            config.id_strategy = raw.parse().map_err(BackendError::Config)?;
        }

        if let Some(raw) = lookup("VENTUREDECK_SEED") {
            config.seed_demo_data = matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BackendConfig::default();
        assert_eq!(config.latency, Duration::from_millis(200));
        assert_eq!(config.id_strategy, IdStrategy::Random);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_lookup_parses_values() {
        let config = BackendConfig::from_lookup(|name| match name {
            "VENTUREDECK_MOCK_LATENCY_MS" => Some("15".into()),
            "VENTUREDECK_ID_STRATEGY" => Some("monotonic".into()),
            "VENTUREDECK_SEED" => Some("TRUE".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.latency, Duration::from_millis(15));
        assert_eq!(config.id_strategy, IdStrategy::Monotonic);
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_lookup_rejects_bad_latency() {
        let err = BackendConfig::from_lookup(|name| {
            (name == "VENTUREDECK_MOCK_LATENCY_MS").then(|| "fast".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, BackendError::Config(_)));
    }
}
