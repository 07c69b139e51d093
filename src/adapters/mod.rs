//! Concrete adapter implementations for ports.

pub mod csv_market_adapter;
pub mod csv_statistics_adapter;
pub mod csv_table;
pub mod csv_trade_log;
pub mod file_config_adapter;
pub mod margin_execution;
pub mod prediction_classifier;
pub mod tracing_observer;
