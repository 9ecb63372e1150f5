//! # Domain Layer
//!
//! Pure hashing logic. NO I/O, NO async.

pub mod projection;
pub mod services;

pub use projection::CanonicalProjection;
pub use services::{canonical_projection, fingerprint, keccak256};
