//! Simulated ledger runtime.
//!
//! Executes the fingerprint-registry contract (`storeHash`, `verifyHash`,
//! `getHashCount`, `getHash`) against in-process state. Gas is charged at
//! one unit of balance per unit of gas used. Failures can be injected
//! for tests.

use crate::domain::abi::{self, Token};
use crate::domain::{
    ContractArtifact, FingerprintEncoding, RpcError, TransactionInfo, TransactionReceipt,
    TransactionRequest,
};
use crate::ports::LedgerRpc;
use async_trait::async_trait;
use parking_lot::Mutex;
use primitive_types::U256;
use sha3::{Digest, Keccak256};
use shared_types::{Address, Fingerprint, TxHash};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Gas charged for a contract creation.
pub const DEPLOY_GAS_USED: u64 = 450_000;
/// Gas charged for a `storeHash` call.
pub const STORE_GAS_USED: u64 = 68_000;

const REVERT: &str = "VM Exception while processing transaction: revert";

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredHash {
    encoding: FingerprintEncoding,
    raw: Vec<u8>,
}

impl StoredHash {
    fn from_fingerprint(encoding: FingerprintEncoding, fingerprint: &Fingerprint) -> Self {
        let raw = match encoding {
            FingerprintEncoding::Bytes32 => fingerprint.as_bytes().to_vec(),
            FingerprintEncoding::String => fingerprint.to_hex().into_bytes(),
        };
        Self { encoding, raw }
    }

    fn as_fingerprint(&self) -> Option<Fingerprint> {
        match self.encoding {
            FingerprintEncoding::Bytes32 => Fingerprint::from_slice(&self.raw),
            FingerprintEncoding::String => std::str::from_utf8(&self.raw).ok()?.parse().ok(),
        }
    }

    fn encode(&self) -> Vec<u8> {
        match self.encoding {
            FingerprintEncoding::Bytes32 => {
                let mut word = [0u8; 32];
                word.copy_from_slice(&self.raw);
                abi::encode_args(&[Token::FixedBytes(word)])
            }
            FingerprintEncoding::String => abi::encode_args(&[Token::String(
                String::from_utf8_lossy(&self.raw).into_owned(),
            )]),
        }
    }
}

#[derive(Default)]
struct Chain {
    accounts: Vec<Address>,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    contracts: HashMap<Address, Vec<StoredHash>>,
    transactions: HashMap<String, (TransactionInfo, TransactionReceipt)>,
    block_number: u64,
    store_calls: usize,
    // failure injection
    unreachable: bool,
    calls_failing: bool,
    rejected: HashSet<Fingerprint>,
    latency: Duration,
}

/// In-process ledger with unlocked, pre-funded accounts.
pub struct InMemoryLedger {
    chain: Mutex<Chain>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn keccak(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

fn revert() -> RpcError {
    RpcError::Rpc {
        code: -32000,
        message: REVERT.to_string(),
    }
}

impl InMemoryLedger {
    /// Three accounts holding 100 ether each.
    #[must_use]
    pub fn new() -> Self {
        let funded = U256::from(100u64) * U256::exp10(18);
        Self::with_accounts(
            (1u8..=3)
                .map(|i| (Address::new([i; 20]), funded))
                .collect(),
        )
    }

    /// Ledger with the given accounts and balances.
    #[must_use]
    pub fn with_accounts(accounts: Vec<(Address, U256)>) -> Self {
        let mut chain = Chain::default();
        for (address, balance) in accounts {
            chain.accounts.push(address);
            chain.balances.insert(address, balance);
        }
        Self {
            chain: Mutex::new(chain),
        }
    }

    /// The registry artifact this ledger executes.
    #[must_use]
    pub fn artifact(encoding: FingerprintEncoding) -> ContractArtifact {
        ContractArtifact::simulated(encoding)
    }

    /// Unlocked accounts, in order.
    #[must_use]
    pub fn account_list(&self) -> Vec<Address> {
        self.chain.lock().accounts.clone()
    }

    /// Overrides an account balance.
    pub fn set_balance(&self, account: Address, balance: U256) {
        self.chain.lock().balances.insert(account, balance);
    }

    /// Makes every call fail as if the runtime were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.chain.lock().unreachable = unreachable;
    }

    /// Makes read-only calls fail while transactions still succeed.
    pub fn set_calls_failing(&self, failing: bool) {
        self.chain.lock().calls_failing = failing;
    }

    /// Reverts any `storeHash` carrying this fingerprint.
    pub fn reject_fingerprint(&self, fingerprint: Fingerprint) {
        self.chain.lock().rejected.insert(fingerprint);
    }

    /// Stops rejecting fingerprints.
    pub fn clear_rejections(&self) {
        self.chain.lock().rejected.clear();
    }

    /// Delays every call.
    pub fn set_latency(&self, latency: Duration) {
        self.chain.lock().latency = latency;
    }

    /// Removes a fingerprint from a contract, as if the ledger were reset.
    pub fn forget_fingerprint(&self, contract: Address, fingerprint: &Fingerprint) {
        if let Some(stored) = self.chain.lock().contracts.get_mut(&contract) {
            stored.retain(|entry| entry.as_fingerprint().as_ref() != Some(fingerprint));
        }
    }

    /// Fingerprints stored by a contract, in insertion order.
    #[must_use]
    pub fn stored_fingerprints(&self, contract: Address) -> Vec<Fingerprint> {
        self.chain
            .lock()
            .contracts
            .get(&contract)
            .map(|stored| stored.iter().filter_map(StoredHash::as_fingerprint).collect())
            .unwrap_or_default()
    }

    /// Number of successful `storeHash` transactions.
    #[must_use]
    pub fn store_calls(&self) -> usize {
        self.chain.lock().store_calls
    }

    async fn enter(&self) -> Result<(), RpcError> {
        let latency = {
            let chain = self.chain.lock();
            if chain.unreachable {
                return Err(RpcError::Connection("simulated ledger unreachable".into()));
            }
            chain.latency
        };
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }

    fn decode_fingerprint(
        encoding: FingerprintEncoding,
        args: &[u8],
    ) -> Result<Fingerprint, RpcError> {
        match encoding {
            FingerprintEncoding::Bytes32 => Ok(Fingerprint::new(abi::decode_bytes32(args)?)),
            FingerprintEncoding::String => abi::decode_string(args)?
                .parse()
                .map_err(|e| RpcError::Abi(format!("{e}"))),
        }
    }

    fn dispatch_store(
        chain: &mut Chain,
        contract: Address,
        calldata: &[u8],
    ) -> Result<(), RpcError> {
        let (selector, args) = abi::split_selector(calldata)?;
        let encoding = if selector == abi::selector("storeHash(bytes32)") {
            FingerprintEncoding::Bytes32
        } else if selector == abi::selector("storeHash(string)") {
            FingerprintEncoding::String
        } else {
            return Err(revert());
        };
        let fingerprint = Self::decode_fingerprint(encoding, args)?;
        if chain.rejected.contains(&fingerprint) {
            return Err(revert());
        }
        let stored = chain.contracts.get_mut(&contract).ok_or_else(revert)?;
        stored.push(StoredHash::from_fingerprint(encoding, &fingerprint));
        chain.store_calls += 1;
        Ok(())
    }

    fn dispatch_call(chain: &Chain, contract: Address, calldata: &[u8]) -> Result<Vec<u8>, RpcError> {
        // No code at the address: the runtime returns empty data.
        let Some(stored) = chain.contracts.get(&contract) else {
            return Ok(Vec::new());
        };
        let (selector, args) = abi::split_selector(calldata)?;

        for encoding in [FingerprintEncoding::Bytes32, FingerprintEncoding::String] {
            if selector == abi::selector(&format!("verifyHash({})", encoding.abi_type())) {
                let fingerprint = Self::decode_fingerprint(encoding, args)?;
                let exists = stored
                    .iter()
                    .any(|entry| entry.as_fingerprint() == Some(fingerprint));
                return Ok(abi::encode_args(&[Token::Uint(U256::from(u8::from(exists)))]));
            }
        }
        if selector == abi::selector("getHashCount()") {
            return Ok(abi::encode_args(&[Token::Uint(U256::from(stored.len()))]));
        }
        if selector == abi::selector("getHash(uint256)") {
            let index = abi::decode_uint(args)?;
            return stored
                .get(index.low_u64() as usize)
                .filter(|_| index < U256::from(stored.len()))
                .map(StoredHash::encode)
                .ok_or_else(revert);
        }
        Err(revert())
    }
}

#[async_trait]
impl LedgerRpc for InMemoryLedger {
    async fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.enter().await?;
        Ok(self.account_list())
    }

    async fn balance(&self, account: Address) -> Result<U256, RpcError> {
        self.enter().await?;
        Ok(self
            .chain
            .lock()
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default())
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<TxHash, RpcError> {
        self.enter().await?;
        let mut chain = self.chain.lock();

        if !chain.accounts.contains(&request.from) {
            return Err(RpcError::Rpc {
                code: -32000,
                message: format!("sender account not recognized: {}", request.from),
            });
        }
        let balance = chain.balances.get(&request.from).copied().unwrap_or_default();
        if balance < U256::from(request.gas) {
            return Err(RpcError::Rpc {
                code: -32000,
                message: "sender doesn't have enough funds to send tx".into(),
            });
        }

        let gas_used = if request.to.is_some() {
            STORE_GAS_USED
        } else {
            DEPLOY_GAS_USED
        };
        if gas_used > request.gas {
            return Err(RpcError::Rpc {
                code: -32000,
                message: "out of gas".into(),
            });
        }

        let nonce = chain.nonces.get(&request.from).copied().unwrap_or(0);
        let contract_address = match request.to {
            None => {
                if request.data.is_empty() {
                    return Err(revert());
                }
                let mut seed = request.from.as_bytes().to_vec();
                seed.extend_from_slice(&nonce.to_be_bytes());
                let created = Address::from_slice(&keccak(&seed)[12..]).ok_or_else(revert)?;
                chain.contracts.insert(created, Vec::new());
                Some(created)
            }
            Some(contract) => {
                Self::dispatch_store(&mut chain, contract, &request.data)?;
                None
            }
        };

        chain.block_number += 1;
        chain.nonces.insert(request.from, nonce + 1);
        chain
            .balances
            .insert(request.from, balance - U256::from(gas_used));

        let mut seed = request.from.as_bytes().to_vec();
        seed.extend_from_slice(&nonce.to_be_bytes());
        seed.extend_from_slice(&request.data);
        let hash = TxHash::from_bytes(keccak(&seed));
        let block_number = chain.block_number;
        chain.transactions.insert(
            hash.as_str().to_string(),
            (
                TransactionInfo {
                    hash: hash.clone(),
                    from: request.from,
                    block_number: Some(block_number),
                    gas: request.gas,
                },
                TransactionReceipt {
                    transaction_hash: hash.clone(),
                    block_number,
                    gas_used,
                    succeeded: true,
                    contract_address,
                },
            ),
        );
        Ok(hash)
    }

    async fn receipt(&self, tx: &TxHash) -> Result<Option<TransactionReceipt>, RpcError> {
        self.enter().await?;
        Ok(self
            .chain
            .lock()
            .transactions
            .get(tx.as_str())
            .map(|(_, receipt)| receipt.clone()))
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, RpcError> {
        self.enter().await?;
        let chain = self.chain.lock();
        if chain.calls_failing {
            return Err(RpcError::Rpc {
                code: -32603,
                message: "simulated call failure".into(),
            });
        }
        Self::dispatch_call(&chain, to, &data)
    }

    async fn transaction(&self, tx: &TxHash) -> Result<Option<TransactionInfo>, RpcError> {
        self.enter().await?;
        Ok(self
            .chain
            .lock()
            .transactions
            .get(tx.as_str())
            .map(|(info, _)| info.clone()))
    }
}
