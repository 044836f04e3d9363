//! Error types for rusts-core

use crate::precision::WritePrecision;
use thiserror::Error;

/// Core error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing measurement name")]
    MissingMeasurement,

    #[error("Field '{field}' has type {actual}, requested {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Timestamp {value} overflows nanoseconds at {precision} precision")]
    PrecisionOverflow {
        value: i128,
        precision: WritePrecision,
    },

    #[error("Invalid precision: {0}")]
    InvalidPrecision(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
