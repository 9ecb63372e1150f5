//! # Ledger Service
//!
//! Implements [`LedgerApi`] over any [`LedgerRpc`] transport and any
//! [`ContractRegistry`]. Transactions are sent from unlocked runtime
//! accounts and their receipts are polled until mined.

use crate::domain::abi;
use crate::domain::{
    ContractArtifact, LedgerError, RpcError, TransactionDetails, TransactionReceipt,
    TransactionRequest,
};
use crate::ports::{LedgerApi, LedgerRpc};
use async_trait::async_trait;
use nc_02_reconciliation_store::ContractRegistry;
use primitive_types::U256;
use shared_types::{Address, ContractHandle, Fingerprint, TxHash};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Ledger Service configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Upper bound on every ledger operation, including receipt polling.
    pub timeout: Duration,
    /// Delay between receipt polls.
    pub receipt_poll_interval: Duration,
    /// Gas limit per fingerprint submission.
    pub submission_gas: u64,
    /// Gas limit per contract deployment.
    pub deployment_gas: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            receipt_poll_interval: Duration::from_millis(250),
            submission_gas: 300_000,
            deployment_gas: 3_000_000,
        }
    }
}

/// Fingerprint-registry client.
pub struct LedgerService<R: LedgerRpc, G: ContractRegistry> {
    rpc: Arc<R>,
    registry: Arc<G>,
    artifact: ContractArtifact,
    config: LedgerConfig,
}

impl<R: LedgerRpc, G: ContractRegistry> LedgerService<R, G> {
    /// Create a new Ledger Service.
    pub fn new(rpc: Arc<R>, registry: Arc<G>, artifact: ContractArtifact, config: LedgerConfig) -> Self {
        Self {
            rpc,
            registry,
            artifact,
            config,
        }
    }

    /// Create a service from an artifact file.
    ///
    /// ## Errors
    ///
    /// - `ArtifactMissing` / `ArtifactInvalid`
    pub fn from_artifact_path(
        rpc: Arc<R>,
        registry: Arc<G>,
        path: impl AsRef<Path>,
        config: LedgerConfig,
    ) -> Result<Self, LedgerError> {
        let artifact = ContractArtifact::load(path)?;
        Ok(Self::new(rpc, registry, artifact, config))
    }

    /// The contract artifact in use.
    pub fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }

    /// Runs `fut` under the configured timeout, mapping failures to `kind`.
    async fn bounded<T, F>(
        &self,
        operation: &str,
        kind: fn(String) -> LedgerError,
        fut: F,
    ) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, RpcError>> + Send,
    {
        match tokio::time::timeout(self.config.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(kind(e.to_string())),
            Err(_) => {
                warn!(operation, timeout = ?self.config.timeout, "Ledger call timed out");
                Err(kind(format!(
                    "{operation} timed out after {}s",
                    self.config.timeout.as_secs_f64()
                )))
            }
        }
    }

    /// Sends a transaction and polls until it is mined.
    async fn send_and_wait(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionReceipt, RpcError> {
        let tx = self.rpc.send_transaction(request).await?;
        debug!(tx = %tx, "Transaction sent, awaiting receipt");
        loop {
            if let Some(receipt) = self.rpc.receipt(&tx).await? {
                if !receipt.succeeded {
                    return Err(RpcError::Reverted(tx.to_string()));
                }
                return Ok(receipt);
            }
            tokio::time::sleep(self.config.receipt_poll_interval).await;
        }
    }
}

#[async_trait]
impl<R: LedgerRpc, G: ContractRegistry> LedgerApi for LedgerService<R, G> {
    async fn resolve_active_contract(&self) -> Result<Option<ContractHandle>, LedgerError> {
        Ok(self.registry.latest_active().await?)
    }

    #[instrument(skip_all, fields(deployer = %deployer))]
    async fn deploy_contract(&self, deployer: Address) -> Result<ContractHandle, LedgerError> {
        let request = TransactionRequest {
            from: deployer,
            to: None,
            gas: self.config.deployment_gas,
            data: self.artifact.bytecode().to_vec(),
        };
        let receipt = self
            .bounded("deploy", LedgerError::Deployment, self.send_and_wait(request))
            .await?;
        let address = receipt.contract_address.ok_or_else(|| {
            LedgerError::Deployment(format!(
                "receipt for {} has no contract address",
                receipt.transaction_hash
            ))
        })?;

        let handle =
            ContractHandle::new_active(address, deployer.to_hex(), receipt.transaction_hash);
        self.registry.record(handle.clone()).await?;
        info!(
            contract = %address,
            tx = %handle.transaction_hash,
            gas_used = receipt.gas_used,
            "Deployed {}",
            self.artifact.name()
        );
        Ok(handle)
    }

    #[instrument(skip_all, fields(contract = %contract, fingerprint = %fingerprint.short()))]
    async fn submit_fingerprint(
        &self,
        contract: Address,
        fingerprint: Fingerprint,
        submitter: Address,
    ) -> Result<TxHash, LedgerError> {
        let request = TransactionRequest {
            from: submitter,
            to: Some(contract),
            gas: self.config.submission_gas,
            data: self.artifact.store_calldata(&fingerprint),
        };
        let receipt = self
            .bounded("storeHash", LedgerError::Submission, self.send_and_wait(request))
            .await?;
        debug!(tx = %receipt.transaction_hash, gas_used = receipt.gas_used, "Fingerprint stored");
        Ok(receipt.transaction_hash)
    }

    async fn verify_fingerprint(
        &self,
        contract: Address,
        fingerprint: Fingerprint,
    ) -> Result<bool, LedgerError> {
        let calldata = self.artifact.verify_calldata(&fingerprint);
        self.bounded("verifyHash", LedgerError::Query, async {
            abi::decode_bool(&self.rpc.call(contract, calldata).await?)
        })
        .await
    }

    async fn accounts(&self) -> Result<Vec<Address>, LedgerError> {
        self.bounded("eth_accounts", LedgerError::Query, self.rpc.accounts())
            .await
    }

    async fn balance_of(&self, identity: Address) -> Result<U256, LedgerError> {
        self.bounded("eth_getBalance", LedgerError::Query, self.rpc.balance(identity))
            .await
    }

    async fn hash_count(&self, contract: Address) -> Result<U256, LedgerError> {
        let calldata = self
            .artifact
            .hash_count_calldata()
            .ok_or_else(|| LedgerError::Query("contract has no getHashCount".into()))?;
        self.bounded("getHashCount", LedgerError::Query, async {
            abi::decode_uint(&self.rpc.call(contract, calldata).await?)
        })
        .await
    }

    async fn hash_at(&self, contract: Address, index: U256) -> Result<String, LedgerError> {
        let (calldata, encoding) = self
            .artifact
            .hash_at_calldata(index)
            .ok_or_else(|| LedgerError::Query("contract has no getHash".into()))?;
        self.bounded("getHash", LedgerError::Query, async {
            encoding.decode(&self.rpc.call(contract, calldata).await?)
        })
        .await
    }

    async fn transaction_details(
        &self,
        tx: &TxHash,
    ) -> Result<Option<TransactionDetails>, LedgerError> {
        self.bounded("eth_getTransactionByHash", LedgerError::Query, async {
            let Some(info) = self.rpc.transaction(tx).await? else {
                return Ok(None);
            };
            let receipt = self.rpc.receipt(tx).await?;
            Ok::<_, RpcError>(Some(TransactionDetails::new(info, receipt)))
        })
        .await
    }
}
