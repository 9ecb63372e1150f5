//! # NyayaCop Ledger Sync Test Suite
//!
//! Unified test crate for flows that span subsystems.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs      # Scripted ledger stub, complaint builders
//!     ├── sync_flows.rs    # Orchestrator passes against the stub
//!     └── persistence.rs   # Full stack over RocksDB and the simulated runtime
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p nc-tests
//! cargo test -p nc-tests integration::sync_flows
//!
//! # Benchmarks
//! cargo bench -p nc-tests
//! ```

pub mod integration;
