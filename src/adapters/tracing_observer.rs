//! Simulation observer that reports checkpoints through `tracing`.

use tracing::{info, warn};

use crate::domain::catalog::MonthPeriodKey;
use crate::domain::simulator::{CandidateOutcome, CandidateReport};
use crate::ports::observer_port::SimulationObserver;

#[derive(Debug, Default)]
pub struct TracingObserver {
    burned_out: usize,
    committed: usize,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn burned_out(&self) -> usize {
        self.burned_out
    }
}

impl SimulationObserver for TracingObserver {
    fn on_bucket_started(&mut self, key: &MonthPeriodKey, candidates: usize) {
        info!(month = %key.month, period = %key.period, candidates, "bucket started");
    }

    fn on_candidate_started(&mut self, key: &MonthPeriodKey, chunk: i64) {
        info!(month = %key.month, period = %key.period, chunk, "trading chunk");
    }

    fn on_progress(&mut self, records_processed: u64, balance: f64) {
        info!(records_processed, balance, "progress");
    }

    fn on_burned_out(&mut self, key: &MonthPeriodKey, chunk: i64, balance: f64) {
        self.burned_out += 1;
        warn!(
            month = %key.month,
            period = %key.period,
            chunk,
            balance,
            "burned out"
        );
    }

    fn on_candidate_committed(&mut self, report: &CandidateReport) {
        self.committed += 1;
        let burned_out = matches!(report.outcome, CandidateOutcome::BurnedOut { .. });
        info!(
            chunk = report.chunk,
            records = report.records_processed,
            trades = report.trades,
            forced_holds = report.forced_holds,
            burned_out,
            path = %report.results_path.display(),
            "chunk committed"
        );
    }

    fn on_bucket_completed(&mut self, key: &MonthPeriodKey) {
        info!(month = %key.month, period = %key.period, "bucket completed");
    }
}
