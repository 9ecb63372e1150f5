//! # Ledger Errors
//!
//! `RpcError` is what a transport reports. `LedgerError` is what callers of
//! the ledger API see: every transport failure is folded into the error kind
//! of the operation that was running.

use nc_02_reconciliation_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the raw ledger transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The runtime could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// HTTP-level failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The runtime answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// Error message from the runtime.
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The transaction was mined but execution reverted.
    #[error("transaction {0} reverted")]
    Reverted(String),

    /// Calldata or return data could not be encoded or decoded.
    #[error("ABI error: {0}")]
    Abi(String),
}

/// Errors surfaced by [`crate::LedgerApi`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The compiled contract artifact does not exist.
    #[error("contract artifact not found at {0}; compile the contract first")]
    ArtifactMissing(PathBuf),

    /// The artifact exists but cannot be used.
    #[error("contract artifact is invalid: {0}")]
    ArtifactInvalid(String),

    /// Deploying a contract failed.
    #[error("deployment failed: {0}")]
    Deployment(String),

    /// Submitting a fingerprint failed. No partial success is reported.
    #[error("submission failed: {0}")]
    Submission(String),

    /// A read-only query failed. The answer is unknown, not negative.
    #[error("query failed: {0}")]
    Query(String),

    /// The contract registry could not be read or written.
    #[error("contract registry: {0}")]
    Registry(#[from] StoreError),
}
