//! # Shared Types Crate
//!
//! Domain entities and value objects used by every ledger sync crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: complaint snapshots, fingerprints, addresses
//!   and contract handles are defined once, here.
//! - **Explicit Schema**: complaint records coming from the complaint API are
//!   parsed into an optional-field schema with documented defaults instead of
//!   being probed field by field downstream.
//! - **Hex on the Wire**: every fixed-width byte value serializes as a
//!   `0x`-prefixed lowercase hex string, matching the ledger JSON-RPC format.

pub mod entities;
pub mod errors;
pub mod primitives;

pub use entities::*;
pub use errors::*;
pub use primitives::*;
