//! # Ledger Sync Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | nc-01 Canonical Hasher | fingerprint per complaint size |
//! | nc-04 Sync Orchestrator | full pass over an in-memory stack |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nc_01_canonical_hasher::fingerprint;
use nc_02_reconciliation_store::InMemoryStore;
use nc_03_ledger_client::{FingerprintEncoding, InMemoryLedger, LedgerConfig, LedgerService};
use nc_04_sync_orchestrator::{InMemorySource, SyncConfig, SyncOrchestrator};
use shared_types::ComplaintRecord;
use std::sync::Arc;
use std::time::Duration;

fn complaint_with_sections(id: usize, sections: usize) -> ComplaintRecord {
    ComplaintRecord::new(format!("c{id}"), "x".repeat(512))
        .with_legal_sections((0..sections).rev().map(|s| format!("IPC {s}")))
}

// ============================================================================
// NC-01: Canonical Hasher
// ============================================================================

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("nc-01-canonical-hasher");

    for sections in [0usize, 8, 64] {
        let complaint = complaint_with_sections(1, sections);
        group.bench_with_input(
            BenchmarkId::new("fingerprint", sections),
            &complaint,
            |b, complaint| b.iter(|| black_box(fingerprint(complaint))),
        );
    }
    group.finish();
}

// ============================================================================
// NC-04: Sync Orchestrator
// ============================================================================

fn bench_sync_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("nc-04-sync-orchestrator");
    group.measurement_time(Duration::from_secs(10));
    let runtime = tokio::runtime::Runtime::new().unwrap();

    for size in [10usize, 100] {
        let backlog: Vec<_> = (0..size).map(|i| complaint_with_sections(i, 4)).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("fresh_pass", size), &backlog, |b, backlog| {
            b.to_async(&runtime).iter(|| async {
                let store = Arc::new(InMemoryStore::new());
                let ledger = LedgerService::new(
                    Arc::new(InMemoryLedger::new()),
                    store.clone(),
                    InMemoryLedger::artifact(FingerprintEncoding::Bytes32),
                    LedgerConfig {
                        receipt_poll_interval: Duration::from_millis(1),
                        ..LedgerConfig::default()
                    },
                );
                let orchestrator = SyncOrchestrator::new(
                    store,
                    Arc::new(ledger),
                    Arc::new(InMemorySource::new(backlog.clone())),
                    SyncConfig {
                        auto_deploy: true,
                        wallet: None,
                    },
                );
                black_box(orchestrator.run_pass().await.unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fingerprint, bench_sync_pass);
criterion_main!(benches);
