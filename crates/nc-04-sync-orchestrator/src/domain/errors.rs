//! # Sync Errors
//!
//! `SyncError` variants are fatal for a pass. Per-complaint problems are
//! reported as outcomes instead.

use nc_02_reconciliation_store::StoreError;
use nc_03_ledger_client::LedgerError;
use shared_types::Address;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal orchestration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The compiled contract artifact is absent.
    #[error("contract artifact not found at {0}; compile the contract first")]
    ArtifactMissing(PathBuf),

    /// The artifact cannot be used.
    #[error("contract artifact is invalid: {0}")]
    ArtifactInvalid(String),

    /// No active contract and auto-deploy is off.
    #[error("no active contract; deploy one or record an existing deployment")]
    NoActiveContract,

    /// Deploying a contract failed.
    #[error("deployment failed: {0}")]
    Deployment(String),

    /// The signing identity has a zero balance.
    #[error("wallet {0} has zero balance; cannot pay for transactions")]
    InsufficientFunds(Address),

    /// The runtime reports no unlocked accounts.
    #[error("ledger runtime has no accounts to sign with")]
    NoSigningIdentity,

    /// A read against the runtime failed before any work started.
    #[error("ledger query failed: {0}")]
    LedgerQuery(String),

    /// The reconciliation store failed.
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[source] StoreError),

    /// The store refused a write the lifecycle does not allow.
    #[error("reconciliation record conflict: {0}")]
    RecordConflict(#[source] StoreError),

    /// A contract with this address is already recorded.
    #[error("contract {0} is already recorded")]
    ContractAlreadyRecorded(Address),

    /// No contract with this address is recorded.
    #[error("contract {0} is not recorded")]
    UnknownContract(Address),

    /// The complaint backlog could not be read.
    #[error("complaint source: {0}")]
    ComplaintSource(#[from] SourceError),
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidTransition { .. }
            | StoreError::DuplicateRecord { .. }
            | StoreError::DuplicateConfirmed(_) => Self::RecordConflict(e),
            StoreError::ContractExists(address) => Self::ContractAlreadyRecorded(address),
            StoreError::ContractNotFound(address) => Self::UnknownContract(address),
            other => Self::PersistenceUnavailable(other),
        }
    }
}

impl From<LedgerError> for SyncError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::ArtifactMissing(path) => Self::ArtifactMissing(path),
            LedgerError::ArtifactInvalid(reason) => Self::ArtifactInvalid(reason),
            LedgerError::Deployment(reason) => Self::Deployment(reason),
            LedgerError::Registry(store) => store.into(),
            LedgerError::Submission(reason) | LedgerError::Query(reason) => {
                Self::LedgerQuery(reason)
            }
        }
    }
}

/// Errors reading the complaint backlog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The export file could not be read.
    #[error("cannot read {path}: {reason}")]
    Io {
        /// File path.
        path: PathBuf,
        /// OS error text.
        reason: String,
    },

    /// The complaint API could not be reached.
    #[error("complaint API request failed: {0}")]
    Http(String),

    /// The complaint API answered with a non-success status.
    #[error("complaint API returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The payload is not a list of complaints.
    #[error("malformed complaint list: {0}")]
    Parse(String),
}
