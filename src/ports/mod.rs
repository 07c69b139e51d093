//! Port traits: the seams between the domain and the outside world.

pub mod classifier_port;
pub mod config_port;
pub mod execution_port;
pub mod market_port;
pub mod observer_port;
pub mod results_port;
pub mod statistics_port;
