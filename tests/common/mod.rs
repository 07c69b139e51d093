#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use treetrader::domain::action::MarketAction;
use treetrader::domain::algorithm::DecisionTreeAlgorithm;
use treetrader::domain::error::TreeTraderError;
use treetrader::domain::statistics::StatisticsSequence;
use treetrader::domain::trade_log::TradeLogRecord;
use treetrader::ports::classifier_port::ClassifierPort;
use treetrader::ports::execution_port::{ExecutionPort, Fill};
use treetrader::ports::market_port::MarketPort;
use treetrader::ports::observer_port::SimulationObserver;
use treetrader::ports::results_port::ResultsPort;
use treetrader::ports::statistics_port::StatisticsPort;
use treetrader::domain::catalog::MonthPeriodKey;
use treetrader::domain::simulator::{CandidateReport, TradingSimulator};

/// A scripted market record: the classifier answers `action`, a sell
/// realises `profit`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub action: MarketAction,
    pub profit: f64,
}

pub fn tick(action: MarketAction) -> Tick {
    Tick {
        action,
        profit: 0.0,
    }
}

pub fn sell_at(profit: f64) -> Tick {
    Tick {
        action: MarketAction::Sell,
        profit,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    MarketConfigured {
        period: String,
        month: String,
        chunk: i64,
    },
    ClassifierConfigured {
        algorithm: DecisionTreeAlgorithm,
        period: String,
        month: String,
        chunk: i64,
    },
    QuantitiesSet {
        bid_size: f64,
        margin_ratio: f64,
    },
    Committed {
        path: PathBuf,
        records: Vec<TradeLogRecord>,
    },
    MarketCleared,
    ExecutionCleared,
}

pub type Journal = Rc<RefCell<Vec<Event>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn commits(journal: &Journal) -> Vec<(PathBuf, Vec<TradeLogRecord>)> {
    journal
        .borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Committed { path, records } => Some((path.clone(), records.clone())),
            _ => None,
        })
        .collect()
}

/// Market whose bucket data is a list of ticks split into fixed-size chunks.
pub struct ScriptedMarket {
    data: HashMap<(String, String), Vec<Tick>>,
    chunk_size: usize,
    queue: Vec<Tick>,
    journal: Journal,
}

impl ScriptedMarket {
    pub fn new(journal: &Journal, chunk_size: usize) -> Self {
        Self {
            data: HashMap::new(),
            chunk_size,
            queue: Vec::new(),
            journal: journal.clone(),
        }
    }

    pub fn with_ticks(mut self, month: &str, period: &str, ticks: Vec<Tick>) -> Self {
        self.data.insert((month.to_string(), period.to_string()), ticks);
        self
    }
}

impl MarketPort for ScriptedMarket {
    type Record = Tick;

    fn configure(
        &mut self,
        period: &str,
        month: &str,
        starting_chunk: i64,
    ) -> Result<(), TreeTraderError> {
        self.journal.borrow_mut().push(Event::MarketConfigured {
            period: period.to_string(),
            month: month.to_string(),
            chunk: starting_chunk,
        });
        let ticks = self
            .data
            .get(&(month.to_string(), period.to_string()))
            .cloned()
            .unwrap_or_default();
        let offset = starting_chunk as usize * self.chunk_size;
        // Stored reversed so `pop` yields records in order.
        self.queue = ticks.into_iter().skip(offset).rev().collect();
        Ok(())
    }

    fn has_next(&self) -> bool {
        !self.queue.is_empty()
    }

    fn next_record(&mut self) -> Result<Tick, TreeTraderError> {
        self.queue.pop().ok_or_else(|| TreeTraderError::Market {
            reason: "exhausted".into(),
        })
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.journal.borrow_mut().push(Event::MarketCleared);
    }
}

/// Classifier that answers whatever the tick was scripted with.
pub struct ScriptedClassifier {
    journal: Journal,
    fail_after: Option<usize>,
    classified: usize,
}

impl ScriptedClassifier {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_after: None,
            classified: 0,
        }
    }

    pub fn failing_after(mut self, records: usize) -> Self {
        self.fail_after = Some(records);
        self
    }
}

impl ClassifierPort<Tick> for ScriptedClassifier {
    fn configure(
        &mut self,
        algorithm: DecisionTreeAlgorithm,
        period: &str,
        month: &str,
        starting_chunk: i64,
    ) -> Result<(), TreeTraderError> {
        self.journal.borrow_mut().push(Event::ClassifierConfigured {
            algorithm,
            period: period.to_string(),
            month: month.to_string(),
            chunk: starting_chunk,
        });
        Ok(())
    }

    fn classify(&mut self, record: &Tick) -> Result<MarketAction, TreeTraderError> {
        if self.fail_after.is_some_and(|limit| self.classified >= limit) {
            return Err(TreeTraderError::Classifier {
                reason: "model file truncated".into(),
            });
        }
        self.classified += 1;
        Ok(record.action)
    }
}

/// Execution that fills one unit per order and realises the tick's profit.
pub struct TickExecution {
    journal: Journal,
}

impl TickExecution {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl ExecutionPort<Tick> for TickExecution {
    fn set_quantities(&mut self, bid_size: f64, margin_ratio: f64) {
        self.journal.borrow_mut().push(Event::QuantitiesSet {
            bid_size,
            margin_ratio,
        });
    }

    fn buy(&mut self, _record: &Tick) -> Result<Fill, TreeTraderError> {
        Ok(Fill {
            quantity: 1.0,
            profit: 0.0,
        })
    }

    fn sell(&mut self, record: &Tick) -> Result<Fill, TreeTraderError> {
        Ok(Fill {
            quantity: 1.0,
            profit: record.profit,
        })
    }

    fn clear(&mut self) {
        self.journal.borrow_mut().push(Event::ExecutionCleared);
    }
}

pub struct MemoryResults {
    journal: Journal,
}

impl MemoryResults {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl ResultsPort for MemoryResults {
    fn commit(&mut self, path: &Path, records: &[TradeLogRecord]) -> Result<(), TreeTraderError> {
        self.journal.borrow_mut().push(Event::Committed {
            path: path.to_path_buf(),
            records: records.to_vec(),
        });
        Ok(())
    }
}

pub struct MockStatistics {
    pub data: HashMap<(String, String), Vec<StatisticsSequence>>,
}

impl MockStatistics {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_sequences(mut self, month: &str, period: &str, seqs: Vec<StatisticsSequence>) -> Self {
        self.data.insert((month.to_string(), period.to_string()), seqs);
        self
    }
}

impl StatisticsPort for MockStatistics {
    fn read_sequences(
        &self,
        month: &str,
        period: &str,
    ) -> Result<Vec<StatisticsSequence>, TreeTraderError> {
        Ok(self
            .data
            .get(&(month.to_string(), period.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

pub fn seq(chunk: i64, cases: u64, c45_errors: u64, c50_errors: u64) -> StatisticsSequence {
    StatisticsSequence {
        chunk,
        cases,
        c45_errors,
        c50_errors,
    }
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub progress: Vec<(u64, f64)>,
    pub burned_out: Vec<(MonthPeriodKey, i64, f64)>,
    pub committed: Vec<CandidateReport>,
    pub buckets_started: Vec<(MonthPeriodKey, usize)>,
    pub buckets_completed: Vec<MonthPeriodKey>,
}

impl SimulationObserver for RecordingObserver {
    fn on_bucket_started(&mut self, key: &MonthPeriodKey, candidates: usize) {
        self.buckets_started.push((key.clone(), candidates));
    }

    fn on_progress(&mut self, records_processed: u64, balance: f64) {
        self.progress.push((records_processed, balance));
    }

    fn on_burned_out(&mut self, key: &MonthPeriodKey, chunk: i64, balance: f64) {
        self.burned_out.push((key.clone(), chunk, balance));
    }

    fn on_candidate_committed(&mut self, report: &CandidateReport) {
        self.committed.push(report.clone());
    }

    fn on_bucket_completed(&mut self, key: &MonthPeriodKey) {
        self.buckets_completed.push(key.clone());
    }
}

pub type MockSimulator =
    TradingSimulator<ScriptedMarket, ScriptedClassifier, TickExecution, MemoryResults>;

pub fn simulator(journal: &Journal, market: ScriptedMarket) -> MockSimulator {
    TradingSimulator::new(
        market,
        ScriptedClassifier::new(journal),
        TickExecution::new(journal),
        MemoryResults::new(journal),
    )
}

pub fn periods(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
