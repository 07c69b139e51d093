//! Market data iterator port trait.

use crate::domain::error::TreeTraderError;

/// Sequential source of market records for one candidate replay.
///
/// The simulator configures the source once per candidate, drains it with
/// `has_next`/`next_record`, then calls `clear` before the next candidate.
pub trait MarketPort {
    type Record;

    fn configure(
        &mut self,
        period: &str,
        month: &str,
        starting_chunk: i64,
    ) -> Result<(), TreeTraderError>;

    fn has_next(&self) -> bool;

    fn next_record(&mut self) -> Result<Self::Record, TreeTraderError>;

    fn clear(&mut self);
}
