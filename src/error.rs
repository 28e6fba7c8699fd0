//! Error types for temporal operations.

use thiserror::Error;

/// Errors produced by temporal construction, queries and encodings.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemporaError {
    /// Malformed construction input or incompatible operands
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A value or time query outside the domain of a temporal value
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// Partial aggregation states that cannot be merged
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl TemporaError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}

#[cfg(feature = "binary")]
impl From<bincode::Error> for TemporaError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::collections::TryReserveError> for TemporaError {
    fn from(err: std::collections::TryReserveError) -> Self {
        Self::Memory(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TemporaError>;
