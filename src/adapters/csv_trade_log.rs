//! Trade log files: one CSV per simulated candidate.

use std::fs;
use std::path::Path;

use crate::domain::error::TreeTraderError;
use crate::domain::record::Symbolic;
use crate::domain::trade_log::{TradeLogRecord, TRADE_LOG_HEADER};
use crate::ports::results_port::ResultsPort;

#[derive(Debug, Clone, Default)]
pub struct CsvTradeLogWriter {
    committed: usize,
}

impl CsvTradeLogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files written so far.
    pub fn committed(&self) -> usize {
        self.committed
    }
}

/// Shortest decimal form, never exponent notation; negative zero prints as `0`.
pub fn format_amount(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{}", value)
    }
}

impl ResultsPort for CsvTradeLogWriter {
    fn commit(&mut self, path: &Path, records: &[TradeLogRecord]) -> Result<(), TreeTraderError> {
        let commit_err = |reason: String| TreeTraderError::Commit {
            path: path.display().to_string(),
            reason,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| commit_err(e.to_string()))?;
        }

        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(path)
            .map_err(|e| commit_err(e.to_string()))?;

        wtr.write_record(TRADE_LOG_HEADER)
            .map_err(|e| commit_err(e.to_string()))?;
        for record in records {
            wtr.write_record([
                format_amount(record.quantity_bought).as_str(),
                format_amount(record.quantity_sold).as_str(),
                format_amount(record.profit).as_str(),
                record.executed_action.symbol(),
                record.correct_action.symbol(),
            ])
            .map_err(|e| commit_err(e.to_string()))?;
        }
        wtr.flush().map_err(|e| commit_err(e.to_string()))?;

        self.committed += 1;
        Ok(())
    }
}
