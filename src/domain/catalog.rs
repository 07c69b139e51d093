//! Statistics sequences grouped by (month, period) bucket.

use std::collections::HashSet;
use std::fmt;

use crate::domain::algorithm::DecisionTreeAlgorithm;
use crate::domain::error::TreeTraderError;
use crate::domain::statistics::{unsupported, StatisticsSequence};
use crate::ports::statistics_port::StatisticsPort;

/// Calendar months in bucket iteration order, `"01"` through `"12"`.
pub fn all_months() -> Vec<String> {
    (1..=12).map(|m| format!("{:02}", m)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonthPeriodKey {
    pub month: String,
    pub period: String,
}

impl MonthPeriodKey {
    pub fn new(month: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            month: month.into(),
            period: period.into(),
        }
    }
}

impl fmt::Display for MonthPeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "month {} period {}", self.month, self.period)
    }
}

/// Candidate sequences per bucket, in bucket insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceCatalog {
    buckets: Vec<(MonthPeriodKey, Vec<StatisticsSequence>)>,
    /// Each bucket's sequences as read from its file; every rank starts here.
    file_order: Vec<Vec<StatisticsSequence>>,
}

impl SequenceCatalog {
    /// Read every (month, period) bucket from `source`, months outer and
    /// periods inner, dropping sequences with fewer than `min_cases` cases.
    pub fn build(
        source: &dyn StatisticsPort,
        months: &[String],
        periods: &[String],
        min_cases: u64,
    ) -> Result<Self, TreeTraderError> {
        let mut seen = HashSet::new();
        let mut buckets = Vec::with_capacity(months.len() * periods.len());
        let mut file_order = Vec::with_capacity(months.len() * periods.len());

        for month in months {
            for period in periods {
                let key = MonthPeriodKey::new(month.as_str(), period.as_str());
                if !seen.insert(key.clone()) {
                    return Err(TreeTraderError::DuplicateBucket {
                        month: key.month,
                        period: key.period,
                    });
                }

                let mut sequences = source.read_sequences(month, period)?;
                sequences.retain(|s| s.cases >= min_cases);
                file_order.push(sequences.clone());
                buckets.push((key, sequences));
            }
        }

        Ok(Self {
            buckets,
            file_order,
        })
    }

    /// Sort each bucket ascending by `algorithm`'s error rate. Equal rates
    /// keep their file order, whatever an earlier `rank` produced.
    pub fn rank(&mut self, algorithm: DecisionTreeAlgorithm) -> Result<(), TreeTraderError> {
        // Checked before any bucket is drained; a failed rank leaves the catalog intact.
        let probe = StatisticsSequence::default();
        if probe.errors_for(algorithm).is_none() {
            return Err(unsupported(algorithm));
        }

        for ((_, ranked), loaded) in self.buckets.iter_mut().zip(&self.file_order) {
            let mut keyed: Vec<(f64, &StatisticsSequence)> = loaded
                .iter()
                .map(|s| (sort_key(s.error_rate(algorithm).unwrap_or(f64::NAN)), s))
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            *ranked = keyed.into_iter().map(|(_, s)| s.clone()).collect();
        }
        Ok(())
    }

    pub fn buckets(&self) -> &[(MonthPeriodKey, Vec<StatisticsSequence>)] {
        &self.buckets
    }

    pub fn get(&self, key: &MonthPeriodKey) -> Option<&[StatisticsSequence]> {
        self.buckets
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, s)| s.as_slice())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total_sequences(&self) -> usize {
        self.buckets.iter().map(|(_, s)| s.len()).sum()
    }
}

/// Zero-case rows have no meaningful rate and sort ahead of every real one.
fn sort_key(rate: f64) -> f64 {
    if rate.is_nan() { f64::NEG_INFINITY } else { rate }
}
