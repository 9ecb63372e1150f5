//! Cross-subsystem integration tests.

pub mod fixtures;

mod persistence;
mod sync_flows;
