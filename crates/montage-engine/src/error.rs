//! Error types for the workflow engine.

use montage_core::MontageError;

/// Errors that abort an engine operation before anything is persisted.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain rule or invariant was violated.
    #[error(transparent)]
    Domain(#[from] MontageError),

    /// The store could not be read or written.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded.
    #[error("store data error: {0}")]
    Data(#[from] serde_json::Error),

    /// The engine configuration file is malformed.
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// The authority thread has stopped and can take no more commands.
    #[error("montage authority is not running")]
    AuthorityClosed,
}

/// Convenience result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
