//! Decision tree classifier port trait.

use crate::domain::action::MarketAction;
use crate::domain::algorithm::DecisionTreeAlgorithm;
use crate::domain::error::TreeTraderError;

pub trait ClassifierPort<R> {
    /// Load the model trained for `algorithm` on `starting_chunk` of the
    /// given bucket.
    fn configure(
        &mut self,
        algorithm: DecisionTreeAlgorithm,
        period: &str,
        month: &str,
        starting_chunk: i64,
    ) -> Result<(), TreeTraderError>;

    fn classify(&mut self, record: &R) -> Result<MarketAction, TreeTraderError>;
}
