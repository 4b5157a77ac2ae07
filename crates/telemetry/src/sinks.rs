// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

/// A lazily-initialized static reference to the global `MetricsSink` implementation.
pub static SINK: OnceCell<&'static dyn MetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Returns a static reference to the configured ledger metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn ledger_metrics() -> &'static dyn LedgerMetricsSink {
    match SINK.get() {
        Some(sink) => sink.as_ledger(),
        None => &NOP_SINK,
    }
}

/// Returns a static reference to the configured storage metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn storage_metrics() -> &'static dyn StorageMetricsSink {
    match SINK.get() {
        Some(sink) => sink.as_storage(),
        None => &NOP_SINK,
    }
}

/// Returns a static reference to the configured access metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn access_metrics() -> &'static dyn AccessMetricsSink {
    match SINK.get() {
        Some(sink) => sink.as_access(),
        None => &NOP_SINK,
    }
}

/// Returns a static reference to the configured error metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    match SINK.get() {
        Some(sink) => sink.as_error(),
        None => &NOP_SINK,
    }
}

// --- Trait Definitions ---

/// A sink for metrics related to the hash chain.
pub trait LedgerMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter of blocks mined and appended.
    fn inc_blocks_appended(&self);
    /// Adds the number of nonces tried while mining one block.
    fn inc_mining_attempts(&self, attempts: u64);
    /// Observes how long mining one block took.
    fn observe_mining_duration(&self, duration_secs: f64);
    /// Sets the gauge for the current chain length, genesis included.
    fn set_chain_length(&self, length: u64);
    /// Increments the counter of verification passes that found a broken chain.
    fn inc_verification_failures(&self);
}
impl LedgerMetricsSink for NopSink {
    fn inc_blocks_appended(&self) {}
    fn inc_mining_attempts(&self, _attempts: u64) {}
    fn observe_mining_duration(&self, _duration_secs: f64) {}
    fn set_chain_length(&self, _length: u64) {}
    fn inc_verification_failures(&self) {}
}

/// A sink for metrics related to the document store.
pub trait StorageMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter of uploaded documents.
    fn inc_documents_uploaded(&self);
    /// Increments the counter of deleted documents.
    fn inc_documents_deleted(&self);
    /// Increments the counter of successful decrypting reads.
    fn inc_documents_read(&self);
    /// Sets the gauge for the total plaintext bytes currently stored.
    fn set_stored_bytes(&self, bytes: u64);
}
impl StorageMetricsSink for NopSink {
    fn inc_documents_uploaded(&self) {}
    fn inc_documents_deleted(&self) {}
    fn inc_documents_read(&self) {}
    fn set_stored_bytes(&self, _bytes: u64) {}
}

/// A sink for metrics related to access control.
pub trait AccessMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter of denied requests, labeled by the operation.
    fn inc_access_denied(&self, operation: &'static str);
    /// Increments the counter of emergency grants created.
    fn inc_emergency_grants(&self);
    /// Increments the counter of emergency grants ended early.
    fn inc_emergency_revocations(&self);
}
impl AccessMetricsSink for NopSink {
    fn inc_access_denied(&self, _operation: &'static str) {}
    fn inc_emergency_grants(&self) {}
    fn inc_emergency_revocations(&self) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink:
    LedgerMetricsSink + StorageMetricsSink + AccessMetricsSink + ErrorMetricsSink
{
    /// Views this sink as a ledger sink.
    fn as_ledger(&self) -> &dyn LedgerMetricsSink;
    /// Views this sink as a storage sink.
    fn as_storage(&self) -> &dyn StorageMetricsSink;
    /// Views this sink as an access sink.
    fn as_access(&self) -> &dyn AccessMetricsSink;
    /// Views this sink as an error sink.
    fn as_error(&self) -> &dyn ErrorMetricsSink;
}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T
where
    T: LedgerMetricsSink + StorageMetricsSink + AccessMetricsSink + ErrorMetricsSink,
{
    fn as_ledger(&self) -> &dyn LedgerMetricsSink {
        self
    }
    fn as_storage(&self) -> &dyn StorageMetricsSink {
        self
    }
    fn as_access(&self) -> &dyn AccessMetricsSink {
        self
    }
    fn as_error(&self) -> &dyn ErrorMetricsSink {
        self
    }
}
