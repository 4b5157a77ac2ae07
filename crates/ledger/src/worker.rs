// Path: crates/ledger/src/worker.rs
//! Runs mining off the async executor.

use crate::chain::Ledger;
use medchain_types::app::MedicalRecord;
use medchain_types::error::ServiceError;
use std::sync::Arc;

/// Hands appends to Tokio's blocking pool so async callers stay responsive
/// while a block is mined.
///
/// There is no cancellation: once submitted, an append runs to completion
/// even if the returned future is dropped.
#[derive(Debug, Clone)]
pub struct MiningWorker {
    ledger: Arc<Ledger>,
}

impl MiningWorker {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Appends `record` on the blocking pool and returns the block hash.
    pub async fn append(&self, record: MedicalRecord) -> Result<String, ServiceError> {
        let ledger = self.ledger.clone();
        let record_id = record.id.clone();
        let joined = tokio::task::spawn_blocking(move || ledger.append(record)).await;
        match joined {
            Ok(result) => Ok(result?),
            Err(e) => {
                tracing::error!(target: "ledger", %record_id, error = %e, "Mining task did not complete");
                Err(ServiceError::Worker(e.to_string()))
            }
        }
    }
}
