//! Margin account execution: fixed-size lots closed first in, first out.

use std::collections::VecDeque;

use crate::adapters::csv_market_adapter::ForexRecord;
use crate::domain::error::TreeTraderError;
use crate::ports::execution_port::{ExecutionPort, Fill};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Lot {
    units: f64,
    entry_price: f64,
}

/// Each buy commits `bid_size` of margin, controlling `bid_size / margin_ratio`
/// units bought at the ask. A sell closes the oldest lot at the bid.
#[derive(Debug, Clone, Default)]
pub struct MarginExecution {
    bid_size: f64,
    margin_ratio: f64,
    lots: VecDeque<Lot>,
    profits: Vec<f64>,
}

impl MarginExecution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_lots(&self) -> usize {
        self.lots.len()
    }

    /// Realised profits since the last `clear`, oldest first.
    pub fn profits(&self) -> &[f64] {
        &self.profits
    }

    fn lot_units(&self) -> Result<f64, TreeTraderError> {
        if self.bid_size <= 0.0 || self.margin_ratio <= 0.0 {
            return Err(TreeTraderError::Market {
                reason: "bid size and margin ratio must be set before trading".into(),
            });
        }
        Ok(self.bid_size / self.margin_ratio)
    }
}

impl ExecutionPort<ForexRecord> for MarginExecution {
    fn set_quantities(&mut self, bid_size: f64, margin_ratio: f64) {
        self.bid_size = bid_size;
        self.margin_ratio = margin_ratio;
    }

    fn buy(&mut self, record: &ForexRecord) -> Result<Fill, TreeTraderError> {
        let units = self.lot_units()?;
        self.lots.push_back(Lot {
            units,
            entry_price: record.ask,
        });
        Ok(Fill {
            quantity: units,
            profit: 0.0,
        })
    }

    fn sell(&mut self, record: &ForexRecord) -> Result<Fill, TreeTraderError> {
        let lot = self.lots.pop_front().ok_or_else(|| TreeTraderError::Market {
            reason: "sell requested with no open lot".into(),
        })?;
        let profit = lot.units * (record.bid - lot.entry_price);
        self.profits.push(profit);
        Ok(Fill {
            quantity: lot.units,
            profit,
        })
    }

    fn clear(&mut self) {
        self.lots.clear();
        self.profits.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quote(bid: f64, ask: f64) -> ForexRecord {
        ForexRecord {
            bid,
            ask,
            ..ForexRecord::default()
        }
    }

    #[test]
    fn buy_sizes_lot_from_margin() {
        let mut exec = MarginExecution::new();
        exec.set_quantities(2_000.0, 0.02);
        let fill = exec.buy(&quote(1.3600, 1.3602)).unwrap();
        assert_relative_eq!(fill.quantity, 100_000.0);
        assert_eq!(fill.profit, 0.0);
        assert_eq!(exec.open_lots(), 1);
    }

    #[test]
    fn sell_closes_oldest_lot_at_bid() {
        let mut exec = MarginExecution::new();
        exec.set_quantities(2_000.0, 0.02);
        exec.buy(&quote(1.3600, 1.3602)).unwrap();
        exec.buy(&quote(1.3700, 1.3702)).unwrap();

        let fill = exec.sell(&quote(1.3652, 1.3654)).unwrap();
        assert_relative_eq!(fill.profit, 500.0, epsilon = 1e-6);
        assert_eq!(exec.open_lots(), 1);

        let fill = exec.sell(&quote(1.3652, 1.3654)).unwrap();
        assert_relative_eq!(fill.profit, -500.0, epsilon = 1e-6);
        assert_eq!(exec.profits().len(), 2);
    }

    #[test]
    fn sell_without_lot_is_error() {
        let mut exec = MarginExecution::new();
        exec.set_quantities(2_000.0, 0.02);
        assert!(exec.sell(&quote(1.0, 1.0)).is_err());
    }

    #[test]
    fn buy_before_quantities_is_error() {
        let mut exec = MarginExecution::new();
        assert!(exec.buy(&quote(1.0, 1.0)).is_err());
    }

    #[test]
    fn clear_forgets_lots() {
        let mut exec = MarginExecution::new();
        exec.set_quantities(2_000.0, 0.02);
        exec.buy(&quote(1.0, 1.0)).unwrap();
        exec.clear();
        assert_eq!(exec.open_lots(), 0);
        assert!(exec.profits().is_empty());
    }
}
