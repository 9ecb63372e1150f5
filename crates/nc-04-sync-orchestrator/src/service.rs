//! # Sync Orchestrator Service
//!
//! One sequential pass over the complaint backlog:
//!
//! 1. Resolve the active contract (deploy it when allowed).
//! 2. Resolve the signing identity.
//! 3. Refuse to start with a zero balance.
//! 4. Submit every complaint without a confirmed record.
//! 5. Re-check every confirmed record against the ledger.
//!
//! Complaints are processed one at a time; a single signing identity means
//! transactions must not race for nonces.

use crate::contracts;
use crate::domain::{ComplaintOutcome, SyncConfig, SyncError, SyncReport};
use crate::ports::ComplaintSource;
use nc_01_canonical_hasher::fingerprint;
use nc_02_reconciliation_store::{
    ContractRegistry, NewRecord, ReconciliationRecord, ReconciliationStore, RecordStatus,
};
use nc_03_ledger_client::LedgerApi;
use shared_types::{Address, ComplaintRecord, ContractHandle, TxHash};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Message stored when a confirmed fingerprint is missing from the ledger.
pub const NOT_ON_LEDGER: &str = "fingerprint not found on ledger during verification";

/// Drives submissions and verifications across the store and the ledger.
pub struct SyncOrchestrator<S, L, C>
where
    S: ReconciliationStore + ContractRegistry,
    L: LedgerApi,
    C: ComplaintSource,
{
    store: Arc<S>,
    ledger: Arc<L>,
    source: Arc<C>,
    config: SyncConfig,
}

impl<S, L, C> SyncOrchestrator<S, L, C>
where
    S: ReconciliationStore + ContractRegistry,
    L: LedgerApi,
    C: ComplaintSource,
{
    /// Creates an orchestrator over the given collaborators.
    pub fn new(store: Arc<S>, ledger: Arc<L>, source: Arc<C>, config: SyncConfig) -> Self {
        Self {
            store,
            ledger,
            source,
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Full pass: submissions, then verification of every confirmed record.
    #[instrument(skip_all, fields(auto_deploy = self.config.auto_deploy))]
    pub async fn run_pass(&self) -> Result<SyncReport, SyncError> {
        let mut report = self.submit_pending().await?;
        report.verifications = self.verify_records().await?;
        info!(summary = %report.summary(), "sync pass complete");
        Ok(report)
    }

    /// Submission phase only.
    #[instrument(skip_all)]
    pub async fn submit_pending(&self) -> Result<SyncReport, SyncError> {
        let existing = self.ledger.resolve_active_contract().await?;
        if existing.is_none() && !self.config.auto_deploy {
            return Err(SyncError::NoActiveContract);
        }

        let signer = self.resolve_signer().await?;
        self.ensure_funded(signer).await?;

        let contract = match existing {
            Some(handle) => handle,
            None => {
                info!(deployer = %signer, "no active contract, deploying");
                self.ledger.deploy_contract(signer).await?
            }
        };

        let complaints = self.source.list_complaints().await?;
        info!(
            complaints = complaints.len(),
            source = %self.source.describe(),
            contract = %contract.address,
            signer = %signer,
            "processing complaint backlog"
        );

        let mut submissions = Vec::with_capacity(complaints.len());
        for complaint in &complaints {
            let outcome = self
                .process_complaint(complaint, contract.address, signer)
                .await?;
            submissions.push(outcome);
        }

        Ok(SyncReport {
            contract: Some(contract.address),
            signer: Some(signer),
            submissions,
            verifications: Vec::new(),
        })
    }

    /// Verification phase only.
    #[instrument(skip_all)]
    pub async fn verify_confirmed(&self) -> Result<SyncReport, SyncError> {
        let verifications = self.verify_records().await?;
        Ok(SyncReport {
            verifications,
            ..SyncReport::default()
        })
    }

    /// Deploys a new contract from the resolved identity and records it.
    #[instrument(skip_all)]
    pub async fn deploy_contract(&self) -> Result<ContractHandle, SyncError> {
        let signer = self.resolve_signer().await?;
        let handle = self.ledger.deploy_contract(signer).await?;
        info!(contract = %handle.address, tx = %handle.transaction_hash, "contract deployed");
        Ok(handle)
    }

    /// Registers a contract deployed outside this tool as the active one,
    /// crediting the configured wallet when there is one.
    pub async fn record_contract(
        &self,
        tx: Option<TxHash>,
        address: Address,
    ) -> Result<ContractHandle, SyncError> {
        contracts::record_contract(self.store.as_ref(), self.config.wallet, tx, address).await
    }

    /// Makes a recorded contract the active one.
    pub async fn activate_contract(&self, address: Address) -> Result<ContractHandle, SyncError> {
        contracts::activate_contract(self.store.as_ref(), address).await
    }

    /// The configured wallet when the runtime has it unlocked, else the
    /// runtime's first account.
    async fn resolve_signer(&self) -> Result<Address, SyncError> {
        let accounts = self.ledger.accounts().await?;
        let first = *accounts.first().ok_or(SyncError::NoSigningIdentity)?;

        match self.config.wallet {
            Some(wallet) if accounts.contains(&wallet) => Ok(wallet),
            Some(wallet) => {
                warn!(
                    configured = %wallet,
                    fallback = %first,
                    "configured wallet not available on the runtime, using first account"
                );
                Ok(first)
            }
            None => {
                debug!(signer = %first, "no wallet configured, using first account");
                Ok(first)
            }
        }
    }

    async fn ensure_funded(&self, signer: Address) -> Result<(), SyncError> {
        let balance = self.ledger.balance_of(signer).await?;
        if balance.is_zero() {
            warn!(signer = %signer, "signing identity has zero balance");
            return Err(SyncError::InsufficientFunds(signer));
        }
        debug!(signer = %signer, balance = %balance, "balance ok");
        Ok(())
    }

    /// Handles one complaint. `Err` is reserved for fatal store failures.
    async fn process_complaint(
        &self,
        complaint: &ComplaintRecord,
        contract: Address,
        signer: Address,
    ) -> Result<ComplaintOutcome, SyncError> {
        let complaint_id = complaint.id.as_str();

        if let Some(confirmed) = self.store.find_confirmed(complaint_id).await? {
            debug!(complaint_id, "already confirmed, skipping");
            return Ok(ComplaintOutcome::already_processed(&confirmed));
        }

        let record = match self.store.find_pending_or_failed(complaint_id).await? {
            Some(record) => self.prepare_retry(record, contract, signer).await?,
            None => {
                let fp = match fingerprint(complaint) {
                    Ok(fp) => fp,
                    Err(e) => {
                        warn!(complaint_id, error = %e, "cannot fingerprint complaint");
                        return Ok(ComplaintOutcome::failed(complaint_id, None, e.to_string()));
                    }
                };
                self.store
                    .create(NewRecord {
                        complaint_id: complaint_id.to_string(),
                        fingerprint: fp,
                        ledger_address: contract,
                        submitter: signer,
                        complaint_data: complaint.clone(),
                    })
                    .await?
            }
        };

        // The row names the contract and signer used below, so verification
        // checks the same contract.
        match self
            .ledger
            .submit_fingerprint(record.contract_address, record.fingerprint, signer)
            .await
        {
            Ok(tx) => {
                self.store.mark_confirmed(record.id, tx.clone()).await?;
                info!(
                    complaint_id,
                    fingerprint = %record.fingerprint.short(),
                    tx = %tx,
                    "fingerprint anchored"
                );
                Ok(ComplaintOutcome::success(complaint_id, record.fingerprint, tx))
            }
            Err(e) => {
                let message = e.to_string();
                self.store.mark_failed(record.id, &message).await?;
                warn!(complaint_id, error = %message, "submission failed");
                Ok(ComplaintOutcome::failed(
                    complaint_id,
                    Some(record.fingerprint),
                    message,
                ))
            }
        }
    }

    /// Failed records are reset to `pending`; pending records left by an
    /// interrupted pass are resumed. Both are retargeted at the current
    /// contract and signer, and keep their stored fingerprint.
    async fn prepare_retry(
        &self,
        record: ReconciliationRecord,
        contract: Address,
        signer: Address,
    ) -> Result<ReconciliationRecord, SyncError> {
        match record.status {
            RecordStatus::Failed => {
                info!(
                    complaint_id = %record.complaint_id,
                    previous_error = record.error_message.as_deref().unwrap_or(""),
                    "retrying failed submission"
                );
                Ok(self.store.reset_for_retry(record.id, contract, signer).await?)
            }
            _ => {
                info!(
                    complaint_id = %record.complaint_id,
                    previous_signer = %record.wallet_used,
                    "resuming pending submission"
                );
                Ok(self.store.resume_pending(record.id, contract, signer).await?)
            }
        }
    }

    async fn verify_records(&self) -> Result<Vec<ComplaintOutcome>, SyncError> {
        let confirmed = self.store.list_confirmed().await?;
        info!(records = confirmed.len(), "verifying confirmed records");

        let mut outcomes = Vec::with_capacity(confirmed.len());
        for record in &confirmed {
            let outcome = match self
                .ledger
                .verify_fingerprint(record.contract_address, record.fingerprint)
                .await
            {
                Ok(true) => {
                    debug!(complaint_id = %record.complaint_id, "verified");
                    ComplaintOutcome::verified(record)
                }
                Ok(false) => {
                    self.store
                        .mark_verification_failed(record.id, NOT_ON_LEDGER)
                        .await?;
                    warn!(
                        complaint_id = %record.complaint_id,
                        contract = %record.contract_address,
                        "fingerprint missing from ledger"
                    );
                    ComplaintOutcome::verification_failed(record, NOT_ON_LEDGER)
                }
                Err(e) => {
                    warn!(complaint_id = %record.complaint_id, error = %e, "verification query failed");
                    ComplaintOutcome::verification_error(record, e.to_string())
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}
