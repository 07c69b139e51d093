//! Backtest simulation engine.
//!
//! The simulator walks the ranked [`SequenceCatalog`] bucket by bucket and,
//! within a bucket, candidate by candidate. Each candidate gets a fresh
//! [`SimulationState`] and replays the market from the chunk after its own
//! through a balance-constrained Buy/Sell/Hold loop. The resulting trade log
//! is committed once per candidate.
//!
//! Calls are gated: [`TradingSimulator::initialize`], then
//! [`TradingSimulator::prepare_for_algorithm`], then
//! [`TradingSimulator::set_quantities`]. Anything called out of order fails
//! with [`TreeTraderError::Precondition`] naming the first missing gate.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::action::MarketAction;
use crate::domain::algorithm::DecisionTreeAlgorithm;
use crate::domain::catalog::{all_months, MonthPeriodKey, SequenceCatalog};
use crate::domain::error::{Gate, TreeTraderError};
use crate::domain::statistics::StatisticsSequence;
use crate::domain::trade_log::TradeLogRecord;
use crate::ports::classifier_port::ClassifierPort;
use crate::ports::execution_port::ExecutionPort;
use crate::ports::market_port::MarketPort;
use crate::ports::observer_port::SimulationObserver;
use crate::ports::results_port::ResultsPort;
use crate::ports::statistics_port::StatisticsPort;

/// Records between two progress notifications.
pub const PROGRESS_INTERVAL: u64 = 100_000;

/// Monetary parameters of a backtest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantities {
    pub initial_balance: f64,
    pub bid_size: f64,
    /// Passed through to the execution port; the simulator never reads it.
    pub margin_ratio: f64,
}

impl Default for Quantities {
    fn default() -> Self {
        Quantities {
            initial_balance: 100_000.0,
            bid_size: 2_000.0,
            margin_ratio: 0.02,
        }
    }
}

/// Balance and position bookkeeping for one candidate replay.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub balance: f64,
    pub initial_balance: f64,
    pub burned_out: bool,
    pub records_processed: u64,
    pub open_positions: usize,
}

impl SimulationState {
    pub fn new(initial_balance: f64) -> Self {
        SimulationState {
            balance: initial_balance,
            initial_balance,
            burned_out: false,
            records_processed: 0,
            open_positions: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = SimulationState::new(self.initial_balance);
    }
}

/// Apply one classified action to `state` and return the log row for it.
///
/// - Buy debits `bid_size` when the balance covers it, otherwise it is logged
///   as a Hold.
/// - Sell needs an open lot, otherwise it is logged as a Hold. A real sell
///   credits `bid_size` plus the realised profit; falling below `bid_size`
///   with no lot left marks the state burned out.
/// - Hold changes nothing.
pub fn apply_action<R, E>(
    state: &mut SimulationState,
    bid_size: f64,
    action: MarketAction,
    record: &R,
    execution: &mut E,
) -> Result<TradeLogRecord, TreeTraderError>
where
    E: ExecutionPort<R> + ?Sized,
{
    match action {
        MarketAction::Buy => {
            if state.balance < bid_size {
                return Ok(TradeLogRecord::held(MarketAction::Buy));
            }
            let fill = execution.buy(record)?;
            state.balance -= bid_size;
            state.open_positions += 1;
            Ok(TradeLogRecord::bought(fill))
        }
        MarketAction::Sell => {
            if state.open_positions == 0 {
                return Ok(TradeLogRecord::held(MarketAction::Sell));
            }
            let fill = execution.sell(record)?;
            state.open_positions -= 1;
            state.balance += bid_size + fill.profit;
            if state.balance < bid_size && state.open_positions == 0 {
                state.burned_out = true;
            }
            Ok(TradeLogRecord::sold(fill))
        }
        MarketAction::Hold => Ok(TradeLogRecord::held(MarketAction::Hold)),
    }
}

/// Path of the trade log committed for one candidate.
pub fn trade_log_path(
    results_root: &Path,
    key: &MonthPeriodKey,
    chunk: i64,
    algorithm: DecisionTreeAlgorithm,
) -> PathBuf {
    results_root.join("TradingResults").join(format!(
        "P{}M{}CH{}A{}.csv",
        key.period, key.month, chunk, algorithm
    ))
}

/// Cooperative stop request, honoured between candidates.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateOutcome {
    /// Market data ran out.
    Completed,
    /// Replay abandoned; `balance` is what was left when it happened.
    BurnedOut { balance: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateReport {
    pub key: MonthPeriodKey,
    pub chunk: i64,
    pub outcome: CandidateOutcome,
    pub records_processed: u64,
    pub final_balance: f64,
    pub trades: usize,
    /// Buys or sells the balance or open positions could not honour.
    pub forced_holds: usize,
    pub results_path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub candidates: Vec<CandidateReport>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn burned_out(&self) -> usize {
        self.candidates
            .iter()
            .filter(|c| matches!(c.outcome, CandidateOutcome::BurnedOut { .. }))
            .count()
    }
}

/// Coarse simulator phase, in gate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Uninitialized,
    Initialized,
    Prepared,
    Ready,
}

#[derive(Debug, Clone)]
struct Setup {
    catalog: SequenceCatalog,
    results_root: PathBuf,
}

#[derive(Debug, Clone)]
enum SimulatorState {
    Uninitialized,
    Initialized {
        setup: Setup,
    },
    Prepared {
        setup: Setup,
        algorithm: DecisionTreeAlgorithm,
    },
    Ready {
        setup: Setup,
        algorithm: DecisionTreeAlgorithm,
        quantities: Quantities,
    },
}

impl SimulatorState {
    fn phase(&self) -> Phase {
        match self {
            SimulatorState::Uninitialized => Phase::Uninitialized,
            SimulatorState::Initialized { .. } => Phase::Initialized,
            SimulatorState::Prepared { .. } => Phase::Prepared,
            SimulatorState::Ready { .. } => Phase::Ready,
        }
    }

    fn missing_gate(&self) -> Option<Gate> {
        match self {
            SimulatorState::Uninitialized => Some(Gate::Initialization),
            SimulatorState::Initialized { .. } => Some(Gate::Preparation),
            SimulatorState::Prepared { .. } => Some(Gate::Quantities),
            SimulatorState::Ready { .. } => None,
        }
    }

    fn setup(&self) -> Option<&Setup> {
        match self {
            SimulatorState::Uninitialized => None,
            SimulatorState::Initialized { setup }
            | SimulatorState::Prepared { setup, .. }
            | SimulatorState::Ready { setup, .. } => Some(setup),
        }
    }

    fn setup_mut(&mut self) -> Option<&mut Setup> {
        match self {
            SimulatorState::Uninitialized => None,
            SimulatorState::Initialized { setup }
            | SimulatorState::Prepared { setup, .. }
            | SimulatorState::Ready { setup, .. } => Some(setup),
        }
    }

    fn with_algorithm(self, algorithm: DecisionTreeAlgorithm) -> Self {
        match self {
            SimulatorState::Uninitialized => SimulatorState::Uninitialized,
            SimulatorState::Initialized { setup } | SimulatorState::Prepared { setup, .. } => {
                SimulatorState::Prepared { setup, algorithm }
            }
            SimulatorState::Ready {
                setup, quantities, ..
            } => SimulatorState::Ready {
                setup,
                algorithm,
                quantities,
            },
        }
    }

    fn with_quantities(self, quantities: Quantities) -> Self {
        match self {
            SimulatorState::Prepared { setup, algorithm }
            | SimulatorState::Ready {
                setup, algorithm, ..
            } => SimulatorState::Ready {
                setup,
                algorithm,
                quantities,
            },
            other => other,
        }
    }
}

/// The external collaborators a replay drives.
struct Desk<M, C, E, R> {
    market: M,
    classifier: C,
    execution: E,
    results: R,
}

pub struct TradingSimulator<M, C, E, R> {
    desk: Desk<M, C, E, R>,
    state: SimulatorState,
    trading: SimulationState,
    log: Vec<TradeLogRecord>,
}

impl<M, C, E, R> TradingSimulator<M, C, E, R>
where
    M: MarketPort,
    C: ClassifierPort<M::Record>,
    E: ExecutionPort<M::Record>,
    R: ResultsPort,
{
    pub fn new(market: M, classifier: C, execution: E, results: R) -> Self {
        TradingSimulator {
            desk: Desk {
                market,
                classifier,
                execution,
                results,
            },
            state: SimulatorState::Uninitialized,
            trading: SimulationState::new(0.0),
            log: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn catalog(&self) -> Option<&SequenceCatalog> {
        self.state.setup().map(|s| &s.catalog)
    }

    pub fn algorithm(&self) -> Option<DecisionTreeAlgorithm> {
        match self.state {
            SimulatorState::Prepared { algorithm, .. } | SimulatorState::Ready { algorithm, .. } => {
                Some(algorithm)
            }
            _ => None,
        }
    }

    pub fn quantities(&self) -> Option<Quantities> {
        match self.state {
            SimulatorState::Ready { quantities, .. } => Some(quantities),
            _ => None,
        }
    }

    /// Current balance of the replay state.
    pub fn balance(&self) -> f64 {
        self.trading.balance
    }

    pub fn simulation_state(&self) -> &SimulationState {
        &self.trading
    }

    /// Build the catalog for months 01..12 and `periods`. Allowed from any
    /// phase; any previous preparation is discarded.
    pub fn initialize(
        &mut self,
        source: &dyn StatisticsPort,
        periods: &[String],
        min_cases: u64,
        results_root: impl Into<PathBuf>,
    ) -> Result<(), TreeTraderError> {
        let catalog = SequenceCatalog::build(source, &all_months(), periods, min_cases)?;
        self.state = SimulatorState::Initialized {
            setup: Setup {
                catalog,
                results_root: results_root.into(),
            },
        };
        Ok(())
    }

    /// Rank every bucket by `algorithm`'s error rate.
    pub fn prepare_for_algorithm(
        &mut self,
        algorithm: DecisionTreeAlgorithm,
    ) -> Result<(), TreeTraderError> {
        let setup = self.state.setup_mut().ok_or(TreeTraderError::Precondition {
            gate: Gate::Initialization,
        })?;
        setup.catalog.rank(algorithm)?;

        let state = std::mem::replace(&mut self.state, SimulatorState::Uninitialized);
        self.state = state.with_algorithm(algorithm);
        Ok(())
    }

    pub fn set_quantities(&mut self, quantities: Quantities) -> Result<(), TreeTraderError> {
        if self.state.phase() < Phase::Prepared {
            if let Some(gate) = self.state.missing_gate() {
                return Err(TreeTraderError::Precondition { gate });
            }
        }

        self.desk
            .execution
            .set_quantities(quantities.bid_size, quantities.margin_ratio);
        self.trading = SimulationState::new(quantities.initial_balance);

        let state = std::mem::replace(&mut self.state, SimulatorState::Uninitialized);
        self.state = state.with_quantities(quantities);
        Ok(())
    }

    pub fn run(
        &mut self,
        observer: &mut dyn SimulationObserver,
    ) -> Result<RunReport, TreeTraderError> {
        self.run_until_cancelled(observer, &CancelFlag::new())
    }

    /// Replay every candidate, checking `cancel` before each one.
    pub fn run_until_cancelled(
        &mut self,
        observer: &mut dyn SimulationObserver,
        cancel: &CancelFlag,
    ) -> Result<RunReport, TreeTraderError> {
        let (setup, algorithm, quantities) = match &self.state {
            SimulatorState::Ready {
                setup,
                algorithm,
                quantities,
            } => (setup, *algorithm, *quantities),
            other => {
                let gate = other.missing_gate().unwrap_or(Gate::Initialization);
                return Err(TreeTraderError::Precondition { gate });
            }
        };

        let mut report = RunReport::default();

        for (key, sequences) in setup.catalog.buckets() {
            observer.on_bucket_started(key, sequences.len());

            for sequence in sequences {
                if cancel.is_cancelled() {
                    report.cancelled = true;
                    return Ok(report);
                }

                let candidate = Candidate {
                    key,
                    sequence,
                    algorithm,
                    quantities,
                    results_root: &setup.results_root,
                };
                let result = self.desk.replay(&candidate, &mut self.trading, &mut self.log, observer)?;
                observer.on_candidate_committed(&result);
                report.candidates.push(result);
            }

            observer.on_bucket_completed(key);
        }

        Ok(report)
    }
}

struct Candidate<'a> {
    key: &'a MonthPeriodKey,
    sequence: &'a StatisticsSequence,
    algorithm: DecisionTreeAlgorithm,
    quantities: Quantities,
    results_root: &'a Path,
}

impl<M, C, E, R> Desk<M, C, E, R>
where
    M: MarketPort,
    C: ClassifierPort<M::Record>,
    E: ExecutionPort<M::Record>,
    R: ResultsPort,
{
    fn replay(
        &mut self,
        candidate: &Candidate<'_>,
        trading: &mut SimulationState,
        log: &mut Vec<TradeLogRecord>,
        observer: &mut dyn SimulationObserver,
    ) -> Result<CandidateReport, TreeTraderError> {
        let key = candidate.key;
        let chunk = candidate.sequence.chunk;
        let bid_size = candidate.quantities.bid_size;

        observer.on_candidate_started(key, chunk);

        *trading = SimulationState::new(candidate.quantities.initial_balance);
        log.clear();

        // The tree was trained on `chunk`; trade it on the data that follows.
        self.classifier
            .configure(candidate.algorithm, &key.period, &key.month, chunk)?;
        self.market.configure(&key.period, &key.month, chunk + 1)?;

        while self.market.has_next() && !trading.burned_out {
            let record = self.market.next_record()?;
            trading.records_processed += 1;

            let action = self.classifier.classify(&record)?;
            let entry = apply_action(trading, bid_size, action, &record, &mut self.execution)?;
            log.push(entry);

            if trading.records_processed % PROGRESS_INTERVAL == 0 {
                observer.on_progress(trading.records_processed, trading.balance);
            }
        }

        let outcome = if trading.burned_out {
            let balance = trading.balance;
            observer.on_burned_out(key, chunk, balance);
            trading.balance = trading.initial_balance;
            trading.burned_out = false;
            CandidateOutcome::BurnedOut { balance }
        } else {
            CandidateOutcome::Completed
        };

        let results_path = trade_log_path(candidate.results_root, key, chunk, candidate.algorithm);
        self.results.commit(&results_path, log)?;

        let report = CandidateReport {
            key: key.clone(),
            chunk,
            outcome,
            records_processed: trading.records_processed,
            final_balance: trading.balance,
            trades: log.len(),
            forced_holds: log.iter().filter(|r| r.is_forced_hold()).count(),
            results_path,
        };

        log.clear();
        self.execution.clear();
        self.market.clear();

        Ok(report)
    }
}
