//! Simulation progress observer port trait.

use crate::domain::catalog::MonthPeriodKey;
use crate::domain::simulator::CandidateReport;

/// Checkpoint hooks invoked by the simulator. All methods default to no-ops.
pub trait SimulationObserver {
    fn on_bucket_started(&mut self, _key: &MonthPeriodKey, _candidates: usize) {}

    fn on_candidate_started(&mut self, _key: &MonthPeriodKey, _chunk: i64) {}

    /// Called every [`PROGRESS_INTERVAL`](crate::domain::simulator::PROGRESS_INTERVAL) records.
    fn on_progress(&mut self, _records_processed: u64, _balance: f64) {}

    fn on_burned_out(&mut self, _key: &MonthPeriodKey, _chunk: i64, _balance: f64) {}

    fn on_candidate_committed(&mut self, _report: &CandidateReport) {}

    fn on_bucket_completed(&mut self, _key: &MonthPeriodKey) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SimulationObserver for NoopObserver {}
