//! Error types for venturedeck-state

use thiserror::Error;

/// Errors that can occur while reading or writing durable client state
#[derive(Error, Debug)]
pub enum StateError {
    /// Key is not usable as a storage slot
    #[error("Invalid storage key: {key}")]
    InvalidKey { key: String },

    /// Stored value could not be decoded
    #[error("Stored value for {key} is not valid UTF-8")]
    InvalidValue { key: String },

    /// Underlying storage I/O failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
