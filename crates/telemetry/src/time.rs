// Path: crates/telemetry/src/time.rs
use crate::sinks::LedgerMetricsSink;
use std::time::Instant;

/// Reports the elapsed time of a mining run to the ledger sink when dropped.
pub struct MiningTimer<'a> {
    sink: &'a dyn LedgerMetricsSink,
    start: Instant,
}

impl<'a> MiningTimer<'a> {
    pub fn new(sink: &'a dyn LedgerMetricsSink) -> Self {
        Self {
            sink,
            start: Instant::now(),
        }
    }
}

impl Drop for MiningTimer<'_> {
    fn drop(&mut self) {
        self.sink
            .observe_mining_duration(self.start.elapsed().as_secs_f64());
    }
}
