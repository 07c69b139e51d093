//! Market actions produced by the classifier and executed by the simulator.

use std::fmt;

use crate::domain::record::Symbolic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarketAction {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Symbolic for MarketAction {
    const SYMBOLS: &'static [(&'static str, Self)] = &[
        ("Buy", MarketAction::Buy),
        ("Sell", MarketAction::Sell),
        ("Hold", MarketAction::Hold),
    ];

    fn symbol(self) -> &'static str {
        match self {
            MarketAction::Buy => "Buy",
            MarketAction::Sell => "Sell",
            MarketAction::Hold => "Hold",
        }
    }
}

impl fmt::Display for MarketAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
