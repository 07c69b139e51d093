//! Order execution port trait.

use crate::domain::error::TreeTraderError;

/// Outcome of one executed order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Fill {
    pub quantity: f64,
    /// Realised profit; always zero for buys.
    pub profit: f64,
}

/// Prices orders against market records and tracks the lots it opened.
///
/// The simulator only calls `sell` while it holds at least one open lot.
pub trait ExecutionPort<R> {
    fn set_quantities(&mut self, bid_size: f64, margin_ratio: f64);

    fn buy(&mut self, record: &R) -> Result<Fill, TreeTraderError>;

    fn sell(&mut self, record: &R) -> Result<Fill, TreeTraderError>;

    /// Forget all open lots.
    fn clear(&mut self);
}
