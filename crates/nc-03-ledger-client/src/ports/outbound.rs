//! # Outbound Ports (Driven Ports)
//!
//! Raw access to an EVM runtime with unlocked accounts.
//!
//! Production: `JsonRpcLedger` (Ethereum JSON-RPC over HTTP)
//! Testing: `InMemoryLedger` (simulated chain)

use crate::domain::{RpcError, TransactionInfo, TransactionReceipt, TransactionRequest};
use async_trait::async_trait;
use primitive_types::U256;
use shared_types::{Address, TxHash};

/// Ledger runtime transport.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// `eth_accounts`
    async fn accounts(&self) -> Result<Vec<Address>, RpcError>;

    /// `eth_getBalance` at the latest block, in the smallest unit.
    async fn balance(&self, account: Address) -> Result<U256, RpcError>;

    /// `eth_sendTransaction`. Returns once the runtime accepted it, not mined.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, RpcError>;

    /// `eth_getTransactionReceipt`. `None` until mined.
    async fn receipt(&self, tx: &TxHash) -> Result<Option<TransactionReceipt>, RpcError>;

    /// `eth_call` at the latest block.
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, RpcError>;

    /// `eth_getTransactionByHash`.
    async fn transaction(&self, tx: &TxHash) -> Result<Option<TransactionInfo>, RpcError>;
}
