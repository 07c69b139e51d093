//! Classifier backed by the decisions a trained tree wrote to disk.
//!
//! For every (period, month, chunk, algorithm) model the tree tooling writes
//! `Predictions/P{period}M{month}CH{chunk}A{algorithm}.csv` under the trees
//! root, one `Timestamp,Action` line per quote it classified.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::adapters::csv_market_adapter::{parse_timestamp, ForexRecord};
use crate::adapters::csv_table::CsvTable;
use crate::domain::action::MarketAction;
use crate::domain::algorithm::DecisionTreeAlgorithm;
use crate::domain::error::TreeTraderError;
use crate::domain::record::{parse_symbol, Field, TabularRecord};
use crate::ports::classifier_port::ClassifierPort;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prediction {
    pub timestamp: NaiveDateTime,
    pub action: MarketAction,
}

fn set_timestamp(r: &mut Prediction, v: &str) -> Result<(), String> {
    r.timestamp = parse_timestamp(v)?;
    Ok(())
}

fn set_action(r: &mut Prediction, v: &str) -> Result<(), String> {
    r.action = parse_symbol(v)?;
    Ok(())
}

impl TabularRecord for Prediction {
    const FIELDS: &'static [Field<Self>] = &[
        Field { name: "timestamp", coerce: set_timestamp },
        Field { name: "action", coerce: set_action },
    ];
}

pub struct PredictionClassifier {
    trees_root: PathBuf,
    table: CsvTable,
    predictions: HashMap<NaiveDateTime, MarketAction>,
}

impl PredictionClassifier {
    pub fn new(trees_root: PathBuf) -> Self {
        Self {
            trees_root,
            table: CsvTable::new(),
            predictions: HashMap::new(),
        }
    }

    pub fn with_table(mut self, table: CsvTable) -> Self {
        self.table = table;
        self
    }

    pub fn predictions_path(
        trees_root: &Path,
        algorithm: DecisionTreeAlgorithm,
        period: &str,
        month: &str,
        chunk: i64,
    ) -> PathBuf {
        trees_root.join("Predictions").join(format!(
            "P{}M{}CH{}A{}.csv",
            period, month, chunk, algorithm
        ))
    }
}

impl ClassifierPort<ForexRecord> for PredictionClassifier {
    fn configure(
        &mut self,
        algorithm: DecisionTreeAlgorithm,
        period: &str,
        month: &str,
        starting_chunk: i64,
    ) -> Result<(), TreeTraderError> {
        let path =
            Self::predictions_path(&self.trees_root, algorithm, period, month, starting_chunk);
        let rows: Vec<Prediction> = self.table.read_records(&path)?;
        self.predictions = rows.into_iter().map(|p| (p.timestamp, p.action)).collect();
        Ok(())
    }

    fn classify(&mut self, record: &ForexRecord) -> Result<MarketAction, TreeTraderError> {
        self.predictions
            .get(&record.timestamp)
            .copied()
            .ok_or_else(|| TreeTraderError::Classifier {
                reason: format!("no prediction for {}", record.timestamp),
            })
    }
}
