//! # Adapters
//!
//! - `JsonRpcLedger`: Ethereum JSON-RPC over HTTP
//! - `InMemoryLedger`: simulated chain for tests

pub mod json_rpc;
pub mod memory;

pub use json_rpc::{JsonRpcLedger, RpcConfig};
pub use memory::InMemoryLedger;
