//! # Fingerprint Service
//!
//! `fingerprint = keccak256(utf8(compact_json(canonical_projection)))`

use super::projection::CanonicalProjection;
use crate::errors::HashError;
use sha3::{Digest, Keccak256};
use shared_types::{ComplaintRecord, Fingerprint};

/// Keccak-256 of arbitrary bytes.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Exact bytes that [`fingerprint`] hashes.
///
/// # Errors
///
/// Returns [`HashError::MissingField`] when the identifier or text is empty.
pub fn canonical_projection(complaint: &ComplaintRecord) -> Result<Vec<u8>, HashError> {
    validate(complaint)?;
    serde_json::to_vec(&CanonicalProjection::from_complaint(complaint))
        .map_err(|e| HashError::Serialization(e.to_string()))
}

/// Computes the fingerprint of a complaint's stable fields.
///
/// # Errors
///
/// Returns [`HashError::MissingField`] when the identifier or text is empty.
pub fn fingerprint(complaint: &ComplaintRecord) -> Result<Fingerprint, HashError> {
    let bytes = canonical_projection(complaint)?;
    Ok(Fingerprint::new(keccak256(&bytes)))
}

fn validate(complaint: &ComplaintRecord) -> Result<(), HashError> {
    if complaint.id.trim().is_empty() {
        return Err(HashError::MissingField("id"));
    }
    if complaint.text.trim().is_empty() {
        return Err(HashError::MissingField("text"));
    }
    Ok(())
}
