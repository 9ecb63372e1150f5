//! # Ledger Entities

use shared_types::{Address, TxHash};

/// A state-changing transaction to be signed by an unlocked runtime account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Sender.
    pub from: Address,
    /// Recipient; `None` creates a contract.
    pub to: Option<Address>,
    /// Gas limit.
    pub gas: u64,
    /// Calldata or creation bytecode.
    pub data: Vec<u8>,
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub gas_used: u64,
    /// `false` when execution reverted.
    pub succeeded: bool,
    /// Created contract, for deployments.
    pub contract_address: Option<Address>,
}

/// A transaction as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionInfo {
    pub hash: TxHash,
    pub from: Address,
    /// `None` while pending.
    pub block_number: Option<u64>,
    /// Gas limit supplied by the sender.
    pub gas: u64,
}

/// Transaction plus receipt, for operator views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDetails {
    pub hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_limit: u64,
    pub gas_used: Option<u64>,
    pub succeeded: Option<bool>,
}

impl TransactionDetails {
    /// Combines a transaction with its receipt, if mined.
    #[must_use]
    pub fn new(info: TransactionInfo, receipt: Option<TransactionReceipt>) -> Self {
        Self {
            hash: info.hash,
            block_number: info
                .block_number
                .or(receipt.as_ref().map(|r| r.block_number)),
            gas_limit: info.gas,
            gas_used: receipt.as_ref().map(|r| r.gas_used),
            succeeded: receipt.map(|r| r.succeeded),
        }
    }
}
