//! Error taxonomy for the vitals core.

use thiserror::Error;

/// Errors produced by the vitals pipeline.
///
/// Configuration errors are fatal at startup. HTTP and transport errors are
/// logged and degraded to empty results by the tolerant call sites
/// (collector, snapshot fetcher); they only abort the process when raised
/// during client construction.
#[derive(Debug, Error)]
pub enum VitalsError {
    /// Missing or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request against an evidence source failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Chat platform transport failure (socket or Web API)
    #[error("chat transport error: {0}")]
    Transport(String),

    /// JSON decoding error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl VitalsError {
    /// Flatten any displayable error into the HTTP variant.
    pub fn http(err: impl ToString) -> Self {
        VitalsError::Http(err.to_string())
    }

    /// Flatten any displayable error into the transport variant.
    pub fn transport(err: impl ToString) -> Self {
        VitalsError::Transport(err.to_string())
    }
}

/// Result type for vitals core operations.
pub type Result<T> = std::result::Result<T, VitalsError>;
