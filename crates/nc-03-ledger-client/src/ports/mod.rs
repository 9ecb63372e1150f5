//! # Ports

pub mod inbound;
pub mod outbound;

pub use inbound::LedgerApi;
pub use outbound::LedgerRpc;
