//! Backtest settings read from configuration and validated before a run.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::domain::algorithm::DecisionTreeAlgorithm;
use crate::domain::error::TreeTraderError;
use crate::domain::simulator::Quantities;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_PERIODS: &str = "300,600,900,1800";
pub const DEFAULT_CHUNK_SIZE: i64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub instrument: String,
    pub year: String,
    pub statistics_path: PathBuf,
    pub market_path: PathBuf,
    pub trees_path: PathBuf,
    pub delimiter: u8,
    /// Whether input files start with a header row.
    pub has_header: bool,
    pub algorithm: DecisionTreeAlgorithm,
    pub periods: Vec<String>,
    pub min_cases: u64,
    pub quantities: Quantities,
    pub chunk_size: usize,
}

impl BacktestSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TreeTraderError> {
        let instrument = required(config, "data", "instrument")?;
        let year = required(config, "data", "year")?;
        let statistics_path = PathBuf::from(required(config, "data", "statistics_path")?);
        let market_path = PathBuf::from(required(config, "data", "market_path")?);
        let trees_path = PathBuf::from(required(config, "data", "trees_path")?);
        let delimiter = parse_delimiter(config.get_string("data", "delimiter").as_deref())?;
        let has_header = config.get_bool("data", "has_header", true);

        let algorithm_name = required(config, "model", "algorithm")?;
        let algorithm = algorithm_name
            .parse::<DecisionTreeAlgorithm>()
            .map_err(|e| invalid("model", "algorithm", e.to_string()))?;

        let periods_str = config
            .get_string("model", "periods")
            .unwrap_or_else(|| DEFAULT_PERIODS.to_string());
        let periods = parse_periods(&periods_str)?;

        let min_cases = checked_int(config, "model", "min_cases", 0)?;
        if min_cases < 0 {
            return Err(invalid("model", "min_cases", "min_cases must be non-negative"));
        }

        let quantities = Quantities {
            initial_balance: checked_double(config, "trading", "initial_balance", 100_000.0)?,
            bid_size: checked_double(config, "trading", "bid_size", 2_000.0)?,
            margin_ratio: checked_double(config, "trading", "margin_ratio", 0.02)?,
        };
        validate_quantities(&quantities)?;

        let chunk_size = checked_int(config, "trading", "chunk_size", DEFAULT_CHUNK_SIZE)?;
        if chunk_size <= 0 {
            return Err(invalid("trading", "chunk_size", "chunk_size must be positive"));
        }

        Ok(BacktestSettings {
            instrument,
            year,
            statistics_path,
            market_path,
            trees_path,
            delimiter,
            has_header,
            algorithm,
            periods,
            min_cases: min_cases as u64,
            quantities,
            chunk_size: chunk_size as usize,
        })
    }

    /// Root for the instrument's trees and results: `trees_path/instrument/year`.
    pub fn results_root(&self) -> PathBuf {
        self.trees_path.join(&self.instrument).join(&self.year)
    }
}

/// Split a comma separated period list, rejecting blanks and repeats.
pub fn parse_periods(input: &str) -> Result<Vec<String>, TreeTraderError> {
    let mut periods = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let period = token.trim();
        if period.is_empty() {
            return Err(invalid("model", "periods", "empty period in list"));
        }
        if !seen.insert(period.to_string()) {
            return Err(invalid(
                "model",
                "periods",
                format!("duplicate period: {}", period),
            ));
        }
        periods.push(period.to_string());
    }

    Ok(periods)
}

fn validate_quantities(q: &Quantities) -> Result<(), TreeTraderError> {
    if q.initial_balance <= 0.0 {
        return Err(invalid(
            "trading",
            "initial_balance",
            "initial_balance must be positive",
        ));
    }
    if q.bid_size <= 0.0 {
        return Err(invalid("trading", "bid_size", "bid_size must be positive"));
    }
    if q.margin_ratio <= 0.0 || q.margin_ratio > 1.0 {
        return Err(invalid(
            "trading",
            "margin_ratio",
            "margin_ratio must be in (0, 1]",
        ));
    }
    Ok(())
}

fn parse_delimiter(value: Option<&str>) -> Result<u8, TreeTraderError> {
    match value {
        None => Ok(b','),
        Some("\\t") | Some("tab") => Ok(b'\t'),
        Some(s) if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        Some(_) => Err(invalid(
            "data",
            "delimiter",
            "delimiter must be a single ASCII character",
        )),
    }
}

/// A key that is absent takes `default`; one that is present must parse.
fn checked_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, TreeTraderError> {
    if let Some(raw) = config.get_string(section, key) {
        if raw.trim().parse::<i64>().is_err() {
            return Err(invalid(section, key, format!("{:?} is not an integer", raw)));
        }
    }
    Ok(config.get_int(section, key, default))
}

fn checked_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, TreeTraderError> {
    if let Some(raw) = config.get_string(section, key) {
        if raw.trim().parse::<f64>().is_err() {
            return Err(invalid(section, key, format!("{:?} is not a number", raw)));
        }
    }
    Ok(config.get_double(section, key, default))
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, TreeTraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(TreeTraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TreeTraderError {
    TreeTraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}
