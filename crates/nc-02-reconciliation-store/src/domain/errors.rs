//! # Store Errors

use super::lifecycle::TransitionRejected;
use shared_types::Address;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by the reconciliation store and contract registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store could not be reached or written.
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    /// No record with this id.
    #[error("reconciliation record {0} not found")]
    RecordNotFound(Uuid),

    /// The complaint already has a record; retries reuse it.
    #[error("complaint {complaint_id} already has record {existing}")]
    DuplicateRecord {
        /// Complaint identifier.
        complaint_id: String,
        /// Record that already tracks it.
        existing: Uuid,
    },

    /// The complaint already has a confirmed record.
    #[error("complaint {0} is already confirmed")]
    DuplicateConfirmed(String),

    /// The lifecycle refused the change.
    #[error("record {record_id}: {source}")]
    InvalidTransition {
        /// Record the change was aimed at.
        record_id: Uuid,
        /// Refused transition.
        #[source]
        source: TransitionRejected,
    },

    /// A contract with this address is already registered.
    #[error("contract {0} is already registered")]
    ContractExists(Address),

    /// No contract with this address is registered.
    #[error("contract {0} is not registered")]
    ContractNotFound(Address),

    /// A stored document could not be decoded.
    #[error("corrupted document: {0}")]
    Corrupted(String),
}

impl StoreError {
    /// Wraps a refused transition for `record_id`.
    #[must_use]
    pub fn transition(record_id: Uuid, source: TransitionRejected) -> Self {
        Self::InvalidTransition { record_id, source }
    }
}
