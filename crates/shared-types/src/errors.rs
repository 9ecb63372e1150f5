//! # Error Types
//!
//! Errors raised while parsing shared value objects.

use thiserror::Error;

/// Errors produced when parsing hex-encoded value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input was not `0x`-prefixed.
    #[error("missing 0x prefix in {kind}: {input}")]
    MissingPrefix { kind: &'static str, input: String },

    /// The input had the wrong number of bytes.
    #[error("invalid {kind} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The input contained non-hex characters.
    #[error("invalid hex in {kind}: {reason}")]
    InvalidHex { kind: &'static str, reason: String },
}
