// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_gauge, register_histogram, register_int_counter,
    register_int_counter_vec, Gauge, Histogram, IntCounter, IntCounterVec,
};

// --- Metric Statics ---
// We use OnceCell to hold the metric collectors. They will be initialized
// exactly once by the `install` function.

static LEDGER_BLOCKS_APPENDED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static LEDGER_MINING_ATTEMPTS_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static LEDGER_MINING_DURATION_SECONDS: OnceCell<Histogram> = OnceCell::new();
static LEDGER_CHAIN_LENGTH: OnceCell<Gauge> = OnceCell::new();
static LEDGER_VERIFICATION_FAILURES_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static STORAGE_DOCUMENTS_UPLOADED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static STORAGE_DOCUMENTS_DELETED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static STORAGE_DOCUMENTS_READ_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static STORAGE_STORED_BYTES: OnceCell<Gauge> = OnceCell::new();
static ACCESS_DENIED_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static ACCESS_EMERGENCY_GRANTS_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ACCESS_EMERGENCY_REVOCATIONS_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Applies `$body` to the collector if `install()` has run; a no-op otherwise.
macro_rules! with_metric {
    ($metric:ident, |$m:ident| $body:expr) => {
        if let Some($m) = $metric.get() {
            $body;
        }
    };
}

impl LedgerMetricsSink for PrometheusSink {
    fn inc_blocks_appended(&self) {
        with_metric!(LEDGER_BLOCKS_APPENDED_TOTAL, |m| m.inc());
    }
    fn inc_mining_attempts(&self, attempts: u64) {
        with_metric!(LEDGER_MINING_ATTEMPTS_TOTAL, |m| m.inc_by(attempts));
    }
    fn observe_mining_duration(&self, duration_secs: f64) {
        with_metric!(LEDGER_MINING_DURATION_SECONDS, |m| m.observe(duration_secs));
    }
    fn set_chain_length(&self, length: u64) {
        with_metric!(LEDGER_CHAIN_LENGTH, |m| m.set(length as f64));
    }
    fn inc_verification_failures(&self) {
        with_metric!(LEDGER_VERIFICATION_FAILURES_TOTAL, |m| m.inc());
    }
}

impl StorageMetricsSink for PrometheusSink {
    fn inc_documents_uploaded(&self) {
        with_metric!(STORAGE_DOCUMENTS_UPLOADED_TOTAL, |m| m.inc());
    }
    fn inc_documents_deleted(&self) {
        with_metric!(STORAGE_DOCUMENTS_DELETED_TOTAL, |m| m.inc());
    }
    fn inc_documents_read(&self) {
        with_metric!(STORAGE_DOCUMENTS_READ_TOTAL, |m| m.inc());
    }
    fn set_stored_bytes(&self, bytes: u64) {
        with_metric!(STORAGE_STORED_BYTES, |m| m.set(bytes as f64));
    }
}

impl AccessMetricsSink for PrometheusSink {
    fn inc_access_denied(&self, operation: &'static str) {
        with_metric!(ACCESS_DENIED_TOTAL, |m| m
            .with_label_values(&[operation])
            .inc());
    }
    fn inc_emergency_grants(&self) {
        with_metric!(ACCESS_EMERGENCY_GRANTS_TOTAL, |m| m.inc());
    }
    fn inc_emergency_revocations(&self) {
        with_metric!(ACCESS_EMERGENCY_REVOCATIONS_TOTAL, |m| m.inc());
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        with_metric!(ERRORS_TOTAL, |m| m.with_label_values(&[kind, variant]).inc());
    }
}

/// Sets a metric static, failing if `install` already ran.
fn set_once<T>(cell: &OnceCell<T>, value: T) -> Result<(), prometheus::Error> {
    cell.set(value).map_err(|_| {
        prometheus::Error::Msg("prometheus sink already installed".to_string())
    })
}

/// Initializes all Prometheus metrics collectors and returns a static reference to the sink.
/// This function must be called only once at application startup.
pub fn install() -> Result<&'static dyn MetricsSink, prometheus::Error> {
    set_once(
        &LEDGER_BLOCKS_APPENDED_TOTAL,
        register_int_counter!(
            "medchain_ledger_blocks_appended_total",
            "Total number of blocks mined and appended to the ledger."
        )?,
    )?;
    set_once(
        &LEDGER_MINING_ATTEMPTS_TOTAL,
        register_int_counter!(
            "medchain_ledger_mining_attempts_total",
            "Total number of nonces tried while mining."
        )?,
    )?;
    set_once(
        &LEDGER_MINING_DURATION_SECONDS,
        register_histogram!(
            "medchain_ledger_mining_duration_seconds",
            "Latency of mining a single block.",
            exponential_buckets(0.0005, 2.0, 16)?
        )?,
    )?;
    set_once(
        &LEDGER_CHAIN_LENGTH,
        register_gauge!(
            "medchain_ledger_chain_length",
            "Current number of blocks in the ledger, genesis included."
        )?,
    )?;
    set_once(
        &LEDGER_VERIFICATION_FAILURES_TOTAL,
        register_int_counter!(
            "medchain_ledger_verification_failures_total",
            "Total verification passes that found a broken chain."
        )?,
    )?;
    set_once(
        &STORAGE_DOCUMENTS_UPLOADED_TOTAL,
        register_int_counter!(
            "medchain_storage_documents_uploaded_total",
            "Total documents uploaded."
        )?,
    )?;
    set_once(
        &STORAGE_DOCUMENTS_DELETED_TOTAL,
        register_int_counter!(
            "medchain_storage_documents_deleted_total",
            "Total documents deleted by their owners."
        )?,
    )?;
    set_once(
        &STORAGE_DOCUMENTS_READ_TOTAL,
        register_int_counter!(
            "medchain_storage_documents_read_total",
            "Total successful decrypting document reads."
        )?,
    )?;
    set_once(
        &STORAGE_STORED_BYTES,
        register_gauge!(
            "medchain_storage_stored_bytes",
            "Total plaintext bytes of all stored documents."
        )?,
    )?;
    set_once(
        &ACCESS_DENIED_TOTAL,
        register_int_counter_vec!(
            "medchain_access_denied_total",
            "Total requests refused by access control.",
            &["operation"]
        )?,
    )?;
    set_once(
        &ACCESS_EMERGENCY_GRANTS_TOTAL,
        register_int_counter!(
            "medchain_access_emergency_grants_total",
            "Total emergency access grants created."
        )?,
    )?;
    set_once(
        &ACCESS_EMERGENCY_REVOCATIONS_TOTAL,
        register_int_counter!(
            "medchain_access_emergency_revocations_total",
            "Total emergency access grants ended early."
        )?,
    )?;
    set_once(
        &ERRORS_TOTAL,
        register_int_counter_vec!(
            "medchain_errors_total",
            "Total number of errors, categorized by type and variant.",
            &["kind", "variant"]
        )?,
    )?;

    static SINK: PrometheusSink = PrometheusSink;
    Ok(&SINK)
}
