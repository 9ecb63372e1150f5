//! # Error Types

use thiserror::Error;

/// Errors raised when a complaint cannot be fingerprinted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HashError {
    /// A required field is empty or absent.
    #[error("complaint is missing required field `{0}`")]
    MissingField(&'static str),

    /// The projection could not be serialized.
    #[error("canonical serialization failed: {0}")]
    Serialization(String),
}
