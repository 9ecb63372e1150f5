//! # Value Objects
//!
//! Fixed-width ledger primitives. These are defined by their value, not
//! identity, and all of them travel as `0x`-prefixed hex strings.

use crate::errors::ParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// Re-export U256 from primitive-types for balances and ABI words
pub use primitive_types::U256;

/// Implements hex parsing, formatting and serde for a fixed-width byte newtype.
macro_rules! fixed_hex {
    ($name:ident, $len:expr, $kind:expr) => {
        impl $name {
            /// Width of the value in bytes.
            pub const LEN: usize = $len;

            /// Creates the value from a byte array.
            #[must_use]
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            /// Creates the value from a slice. Returns None if wrong length.
            #[must_use]
            pub fn from_slice(slice: &[u8]) -> Option<Self> {
                <[u8; $len]>::try_from(slice).ok().map(Self)
            }

            /// Returns the underlying bytes.
            #[must_use]
            pub const fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Full lowercase hex encoding with `0x` prefix.
            #[must_use]
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let digits = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                    .ok_or_else(|| ParseError::MissingPrefix {
                        kind: $kind,
                        input: s.to_string(),
                    })?;
                let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex {
                    kind: $kind,
                    reason: e.to_string(),
                })?;
                Self::from_slice(&bytes).ok_or(ParseError::InvalidLength {
                    kind: $kind,
                    expected: $len,
                    actual: bytes.len(),
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte ledger account or contract address.
///
/// Parsing is case-insensitive, so a checksummed address and its lowercase
/// form compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

fixed_hex!(Address, 20, "address");

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

// =============================================================================
// FINGERPRINT (32 bytes)
// =============================================================================

/// Keccak-256 digest identifying a complaint's content at a point in time.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Fingerprint(pub [u8; 32]);

fixed_hex!(Fingerprint, 32, "fingerprint");

impl Fingerprint {
    /// First ten characters of the hex form, for tables.
    #[must_use]
    pub fn short(&self) -> String {
        let full = self.to_hex();
        format!("{}...", &full[..10])
    }
}

// =============================================================================
// TRANSACTION REFERENCE
// =============================================================================

/// Opaque reference to a ledger transaction.
///
/// Normally a `0x`-prefixed 32-byte hash, but contracts registered by hand
/// may carry a free-form marker instead, so the value is kept verbatim.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    /// Marker used for contracts registered without a deployment transaction.
    pub const MANUAL: &'static str = "manually-recorded";

    /// Wraps a transaction reference.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Builds a reference from raw hash bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    /// Returns the reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================
