//! Error types for rusts-line-protocol

use rusts_core::CoreError;
use thiserror::Error;

/// Line protocol errors
#[derive(Debug, Error)]
pub enum LineProtocolError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid write option: {0}")]
    InvalidOption(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for line protocol operations
pub type Result<T> = std::result::Result<T, LineProtocolError>;
