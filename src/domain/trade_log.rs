//! One row of simulation output per processed market record.

use crate::domain::action::MarketAction;
use crate::ports::execution_port::Fill;

pub const TRADE_LOG_HEADER: [&str; 5] = [
    "QuantityBought",
    "QuantitySold",
    "Profit",
    "ExecutedAction",
    "CorrectAction",
];

#[derive(Debug, Clone, PartialEq)]
pub struct TradeLogRecord {
    pub quantity_bought: f64,
    pub quantity_sold: f64,
    pub profit: f64,
    pub executed_action: MarketAction,
    /// The action the classifier asked for.
    pub correct_action: MarketAction,
}

impl TradeLogRecord {
    pub fn bought(fill: Fill) -> Self {
        Self {
            quantity_bought: fill.quantity,
            quantity_sold: 0.0,
            profit: 0.0,
            executed_action: MarketAction::Buy,
            correct_action: MarketAction::Buy,
        }
    }

    pub fn sold(fill: Fill) -> Self {
        Self {
            quantity_bought: 0.0,
            quantity_sold: fill.quantity,
            profit: fill.profit,
            executed_action: MarketAction::Sell,
            correct_action: MarketAction::Sell,
        }
    }

    /// A hold, either asked for or forced because `requested` could not execute.
    pub fn held(requested: MarketAction) -> Self {
        Self {
            quantity_bought: 0.0,
            quantity_sold: 0.0,
            profit: 0.0,
            executed_action: MarketAction::Hold,
            correct_action: requested,
        }
    }

    pub fn is_forced_hold(&self) -> bool {
        self.executed_action == MarketAction::Hold && self.correct_action != MarketAction::Hold
    }
}
