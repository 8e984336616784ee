//! Storage-level errors.
//!
//! These never escape to engine callers as failures: the persistence
//! adapter logs them and falls back (secondary store, provided default).

use thiserror::Error;

/// Result alias for KV-store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by a [`crate::kv::KvStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure (disk full, permissions, missing directory).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The backend is not usable (e.g. its directory could not be created).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A requested entry does not exist.
    #[error("missing key: {0}")]
    MissingKey(String),
}
