// Path: crates/telemetry/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Medchain Telemetry
//!
//! Observability for the medical record node: structured logging
//! initialization, a Prometheus metrics endpoint, and abstract sinks that
//! decouple metric instrumentation in the ledger, storage and access crates
//! from the backend.

/// A lightweight HTTP server for `/metrics`, `/healthz`, `/readyz` and `/chain`.
pub mod http;
/// The initialization routine for global structured logging.
pub mod init;
/// The concrete implementation of metrics sinks using the `prometheus` crate.
pub mod prometheus;
/// Abstract traits (`*MetricsSink`) that define the contract for metrics reporting.
pub mod sinks;
/// An RAII timer for mining runs.
pub mod time;

pub use sinks::{access_metrics, error_metrics, ledger_metrics, storage_metrics};
