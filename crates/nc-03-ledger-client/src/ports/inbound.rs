//! # Inbound Ports (Driving Ports)
//!
//! The API the sync orchestrator and operator CLI use.

use crate::domain::{LedgerError, TransactionDetails};
use async_trait::async_trait;
use primitive_types::U256;
use shared_types::{Address, ContractHandle, Fingerprint, TxHash};

/// Fingerprint-registry operations on the ledger.
///
/// Every call is bounded by the configured timeout; a timeout surfaces as
/// the operation's own error kind.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Most recently deployed active contract handle.
    ///
    /// ## Errors
    ///
    /// - `Registry`: the handle registry could not be read
    async fn resolve_active_contract(&self) -> Result<Option<ContractHandle>, LedgerError>;

    /// Deploys a fresh registry contract and records it as active.
    ///
    /// ## Errors
    ///
    /// - `Deployment`: deployer cannot pay, runtime unreachable, or reverted
    async fn deploy_contract(&self, deployer: Address) -> Result<ContractHandle, LedgerError>;

    /// Writes a fingerprint and waits for it to be mined.
    ///
    /// ## Errors
    ///
    /// - `Submission`: any failure; there is no partial-success signal
    async fn submit_fingerprint(
        &self,
        contract: Address,
        fingerprint: Fingerprint,
        submitter: Address,
    ) -> Result<TxHash, LedgerError>;

    /// Read-only existence check.
    ///
    /// ## Errors
    ///
    /// - `Query`: the answer is unknown; callers must not treat it as `false`
    async fn verify_fingerprint(
        &self,
        contract: Address,
        fingerprint: Fingerprint,
    ) -> Result<bool, LedgerError>;

    /// Unlocked runtime accounts.
    async fn accounts(&self) -> Result<Vec<Address>, LedgerError>;

    /// Balance of an identity in the smallest unit.
    async fn balance_of(&self, identity: Address) -> Result<U256, LedgerError>;

    /// Number of fingerprints stored by a contract.
    async fn hash_count(&self, contract: Address) -> Result<U256, LedgerError>;

    /// Stored fingerprint at `index`, in display form.
    async fn hash_at(&self, contract: Address, index: U256) -> Result<String, LedgerError>;

    /// Block, gas and receipt status of a transaction, if the runtime knows it.
    async fn transaction_details(
        &self,
        tx: &TxHash,
    ) -> Result<Option<TransactionDetails>, LedgerError>;
}
