//! Error types for venturedeck-backend
//!
//! The mock backend never produces these. They exist so a real backend can
//! report transport failures through the same signatures.

use thiserror::Error;

/// Errors a backend facade implementation may return
#[derive(Error, Debug)]
pub enum BackendError {
    /// Backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Request was rejected by the backend
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Invalid backend configuration
    #[error("Invalid backend configuration: {0}")]
    Config(String),

    /// Payload could not be (de)serialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
