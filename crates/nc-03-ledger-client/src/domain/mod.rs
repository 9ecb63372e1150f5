//! # Domain Layer

pub mod abi;
pub mod artifact;
pub mod entities;
pub mod errors;

pub use artifact::{ContractArtifact, FingerprintEncoding};
pub use entities::{TransactionDetails, TransactionInfo, TransactionReceipt, TransactionRequest};
pub use errors::{LedgerError, RpcError};
