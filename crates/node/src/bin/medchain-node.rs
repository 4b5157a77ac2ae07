// Path: crates/node/src/bin/medchain-node.rs
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

use anyhow::{anyhow, Result};
use clap::Parser;
use medchain_node::{LedgerProbe, MedicalRecordService};
use medchain_telemetry::init::{init_tracing, init_tracing_with, LogFormat};
use medchain_types::app::SystemClock;
use medchain_types::config::NodeConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[clap(name = "medchain-node", about = "Hosts the medical record ledger and document store.")]
struct NodeOpts {
    #[clap(long, help = "Path to the node.toml configuration file. Defaults apply when absent.")]
    config: Option<PathBuf>,
    #[clap(
        long,
        env = "TELEMETRY_ADDR",
        help = "Overrides telemetry.addr in node.toml"
    )]
    telemetry_addr: Option<SocketAddr>,
    #[clap(long, help = "Human-readable logs instead of JSON")]
    pretty_logs: bool,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "node", error = %e, "Failed to install CTRL+C handler");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = NodeOpts::parse();

    // 1. Initialize tracing FIRST
    if opts.pretty_logs {
        init_tracing_with(LogFormat::Compact, "info")?;
    } else {
        init_tracing()?;
    }

    // 2. Register the metrics backend before any component reports.
    let metrics_sink = medchain_telemetry::prometheus::install()?;
    medchain_telemetry::sinks::SINK
        .set(metrics_sink)
        .map_err(|_| anyhow!("metrics sink already set"))?;

    let mut config = match &opts.config {
        Some(path) => NodeConfig::load(path)?,
        None => NodeConfig::default(),
    };
    if let Some(addr) = opts.telemetry_addr {
        config.telemetry.addr = Some(addr);
    }
    tracing::info!(
        target: "node",
        event = "startup",
        difficulty = config.ledger.difficulty,
        fingerprint = ?config.ledger.fingerprint,
        addressing = ?config.storage.addressing,
        journal = ?config.ledger.journal_path,
    );

    let telemetry_addr = config.telemetry.addr;
    let service = Arc::new(MedicalRecordService::new(config, Arc::new(SystemClock))?);
    let info = service.chain_info();
    tracing::info!(
        target: "node",
        length = info.length,
        is_valid = info.is_valid,
        tip = %info.last_block.hash,
        "Ledger ready"
    );

    match telemetry_addr {
        Some(addr) => {
            let probe = Arc::new(LedgerProbe::new(
                service.ledger().clone(),
                service.documents().clone(),
            ));
            medchain_telemetry::http::run_server(addr, probe, shutdown_signal()).await;
        }
        None => {
            tracing::info!(target: "node", "Telemetry disabled; waiting for CTRL+C");
            shutdown_signal().await;
        }
    }

    tracing::info!(target: "node", event = "shutdown", length = service.ledger().len());
    Ok(())
}
