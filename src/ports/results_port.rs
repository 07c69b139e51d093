//! Trade log persistence port trait.

use std::path::Path;

use crate::domain::error::TreeTraderError;
use crate::domain::trade_log::TradeLogRecord;

/// Persists one candidate's trade log. Records must be written in the order given.
pub trait ResultsPort {
    fn commit(&mut self, path: &Path, records: &[TradeLogRecord]) -> Result<(), TreeTraderError>;
}
