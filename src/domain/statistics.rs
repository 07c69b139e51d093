//! Per-chunk model statistics read from the statistics files.

use crate::domain::algorithm::DecisionTreeAlgorithm;
use crate::domain::error::TreeTraderError;
use crate::domain::record::{parse_value, Field, TabularRecord};

/// Statistics for one chunk of training data: how many cases the trees were
/// evaluated on and how many each algorithm misclassified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatisticsSequence {
    pub chunk: i64,
    pub cases: u64,
    pub c45_errors: u64,
    pub c50_errors: u64,
}

impl StatisticsSequence {
    /// Error count recorded for `algorithm`, or `None` when the statistics
    /// files carry no column for it.
    pub fn errors_for(&self, algorithm: DecisionTreeAlgorithm) -> Option<u64> {
        match algorithm {
            DecisionTreeAlgorithm::C45 => Some(self.c45_errors),
            DecisionTreeAlgorithm::C50 => Some(self.c50_errors),
            DecisionTreeAlgorithm::Id3 => None,
        }
    }

    /// `errors / cases` for `algorithm`.
    pub fn error_rate(&self, algorithm: DecisionTreeAlgorithm) -> Result<f64, TreeTraderError> {
        let errors = self
            .errors_for(algorithm)
            .ok_or_else(|| unsupported(algorithm))?;
        Ok(errors as f64 / self.cases as f64)
    }
}

pub(crate) fn unsupported(algorithm: DecisionTreeAlgorithm) -> TreeTraderError {
    TreeTraderError::UnsupportedAlgorithm {
        algorithm: algorithm.to_string(),
    }
}

fn set_chunk(r: &mut StatisticsSequence, v: &str) -> Result<(), String> {
    r.chunk = parse_value(v)?;
    Ok(())
}

fn set_cases(r: &mut StatisticsSequence, v: &str) -> Result<(), String> {
    r.cases = parse_value(v)?;
    Ok(())
}

fn set_c45_errors(r: &mut StatisticsSequence, v: &str) -> Result<(), String> {
    r.c45_errors = parse_value(v)?;
    Ok(())
}

fn set_c50_errors(r: &mut StatisticsSequence, v: &str) -> Result<(), String> {
    r.c50_errors = parse_value(v)?;
    Ok(())
}

impl TabularRecord for StatisticsSequence {
    const FIELDS: &'static [Field<Self>] = &[
        Field { name: "chunk", coerce: set_chunk },
        Field { name: "cases", coerce: set_cases },
        Field { name: "c45_errors", coerce: set_c45_errors },
        Field { name: "c50_errors", coerce: set_c50_errors },
    ];
}
