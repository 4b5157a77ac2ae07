// Path: crates/node/src/probe.rs
use medchain_ledger::Ledger;
use medchain_storage::DocumentStore;
use medchain_telemetry::http::HealthProbe;
use std::sync::Arc;

/// Backs `/readyz` and `/chain` with the live ledger.
#[derive(Debug, Clone)]
pub struct LedgerProbe {
    ledger: Arc<Ledger>,
    documents: Arc<DocumentStore>,
}

impl LedgerProbe {
    pub fn new(ledger: Arc<Ledger>, documents: Arc<DocumentStore>) -> Self {
        Self { ledger, documents }
    }
}

impl HealthProbe for LedgerProbe {
    fn is_ready(&self) -> bool {
        self.ledger.verify()
    }

    fn chain_summary(&self) -> serde_json::Value {
        let info = self.ledger.chain_info();
        let stats = self.documents.stats();
        serde_json::json!({
            "length": info.length,
            "is_valid": info.is_valid,
            "difficulty": self.ledger.difficulty(),
            "fingerprint": self.ledger.hasher().name(),
            "last_block": {
                "index": info.last_block.index,
                "hash": info.last_block.hash,
                "timestamp": info.last_block.timestamp,
            },
            "documents": stats,
        })
    }
}
