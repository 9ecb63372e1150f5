//! # Adapters
//!
//! - `InMemoryStore`: tests and dry runs
//! - `RocksDbStore`: embedded production store

pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocks_db;

pub use memory::InMemoryStore;
#[cfg(feature = "rocksdb")]
pub use rocks_db::{RocksDbConfig, RocksDbStore};
