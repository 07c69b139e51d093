//! Core domain types and logic.

pub mod action;
pub mod algorithm;
pub mod catalog;
pub mod error;
pub mod record;
pub mod settings;
pub mod simulator;
pub mod statistics;
pub mod trade_log;
