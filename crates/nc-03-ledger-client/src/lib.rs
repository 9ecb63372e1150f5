//! # NC-03 Ledger Client
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! Talks to the fingerprint-registry smart contract on a local EVM runtime:
//! deploys it, writes fingerprints, checks that they are still there, and
//! reads accounts, balances and transaction details for the operator.
//!
//! ## Contract Surface
//!
//! | Function | Kind | Gas |
//! |----------|------|-----|
//! | `storeHash(bytes32\|string)` | transaction | 300 000 |
//! | `verifyHash(bytes32\|string) -> bool` | call | - |
//! | `getHashCount() -> uint256` | call | - |
//! | `getHash(uint256) -> bytes32\|string` | call | - |
//! | creation | transaction | 3 000 000 |
//!
//! The fingerprint argument type is read from the compiled artifact.
//!
//! ## Error Mapping
//!
//! Transport failures and timeouts are reported as the error kind of the
//! running operation: `Deployment`, `Submission` or `Query`. A `Query`
//! error means "unknown", never "absent".
//!
//! ## Module Structure
//!
//! ```text
//! nc-03-ledger-client/
//! ├── domain/     # ABI codec, ContractArtifact, receipts, errors
//! ├── ports/      # LedgerApi (inbound), LedgerRpc (outbound)
//! ├── adapters/   # JsonRpcLedger, InMemoryLedger
//! └── service.rs  # LedgerService
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryLedger, JsonRpcLedger, RpcConfig};
pub use domain::{
    ContractArtifact, FingerprintEncoding, LedgerError, RpcError, TransactionDetails,
    TransactionInfo, TransactionReceipt, TransactionRequest,
};
pub use ports::{LedgerApi, LedgerRpc};
pub use service::{LedgerConfig, LedgerService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
