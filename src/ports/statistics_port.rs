//! Statistics source port trait.

use crate::domain::error::TreeTraderError;
use crate::domain::statistics::StatisticsSequence;

/// Yields the statistics sequences recorded for one (month, period) bucket,
/// in file order.
pub trait StatisticsPort {
    fn read_sequences(
        &self,
        month: &str,
        period: &str,
    ) -> Result<Vec<StatisticsSequence>, TreeTraderError>;
}
