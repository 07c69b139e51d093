//! Domain error types.

use std::fmt;

/// A gate that must be passed before the simulator can trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Initialization,
    Preparation,
    Quantities,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gate::Initialization => "initialization",
            Gate::Preparation => "preparation",
            Gate::Quantities => "quantities",
        };
        f.write_str(name)
    }
}

/// Top-level error type for treetrader.
#[derive(Debug, thiserror::Error)]
pub enum TreeTraderError {
    #[error("cannot access {path}: {reason}")]
    DataAccess { path: String, reason: String },

    #[error("schema mismatch at line {line}, field `{field}`: {reason}")]
    SchemaMismatch {
        line: u64,
        field: String,
        reason: String,
    },

    #[error("unsupported algorithm: {algorithm}")]
    UnsupportedAlgorithm { algorithm: String },

    #[error("missing {gate}: the simulator must pass {gate} before this call")]
    Precondition { gate: Gate },

    #[error("duplicate bucket: month {month}, period {period}")]
    DuplicateBucket { month: String, period: String },

    #[error("market data error: {reason}")]
    Market { reason: String },

    #[error("classifier error: {reason}")]
    Classifier { reason: String },

    #[error("failed to commit results to {path}: {reason}")]
    Commit { path: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TreeTraderError> for std::process::ExitCode {
    fn from(err: &TreeTraderError) -> Self {
        let code: u8 = match err {
            TreeTraderError::Io(_) => 1,
            TreeTraderError::ConfigParse { .. }
            | TreeTraderError::ConfigMissing { .. }
            | TreeTraderError::ConfigInvalid { .. } => 2,
            TreeTraderError::DataAccess { .. }
            | TreeTraderError::SchemaMismatch { .. }
            | TreeTraderError::DuplicateBucket { .. } => 3,
            TreeTraderError::UnsupportedAlgorithm { .. } | TreeTraderError::Precondition { .. } => {
                4
            }
            TreeTraderError::Market { .. }
            | TreeTraderError::Classifier { .. }
            | TreeTraderError::Commit { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
