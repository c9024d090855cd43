//! Error taxonomy for venturedeck-core.

use venturedeck_backend::BackendError;
use venturedeck_state::StateError;

/// Errors surfaced by core orchestration.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("state error: {0}")]
    State(#[from] StateError),

    #[error("invalid route trees: {0}")]
    InvalidRouteTrees(String),
}

/// Result type for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
