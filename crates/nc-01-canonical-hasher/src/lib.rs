//! # NC-01 Canonical Hasher - Complaint Fingerprinting
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Derives a deterministic keccak-256 fingerprint from a complaint record so
//! that the ledger can later prove the record was not altered.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | INVARIANT-1 | Same logical fields give the same digest | `domain/projection.rs` - fixed field order, sorted arrays |
//! | INVARIANT-2 | Array order never changes the digest | `domain/projection.rs` - `sorted()` |
//! | INVARIANT-3 | Identifier and text are present | `domain/services.rs` - `validate()` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use nc_01_canonical_hasher::prelude::*;
//!
//! let complaint = ComplaintRecord::new("abc123", "theft reported")
//!     .with_legal_sections(["IPC 379"]);
//! let fp = fingerprint(&complaint)?;
//! println!("{fp}");
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod domain;
pub mod errors;

pub use domain::{canonical_projection, fingerprint, keccak256};
pub use errors::HashError;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::domain::{canonical_projection, fingerprint, keccak256};
    pub use crate::errors::HashError;
    pub use shared_types::{ComplaintRecord, Fingerprint};
}

/// Subsystem ID.
pub const SUBSYSTEM_ID: u8 = 1;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "Canonical Hasher";
