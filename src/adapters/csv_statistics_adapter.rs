//! Statistics files on disk, one per (month, period) bucket.

use std::path::PathBuf;

use crate::adapters::csv_table::CsvTable;
use crate::domain::error::TreeTraderError;
use crate::domain::statistics::StatisticsSequence;
use crate::ports::statistics_port::StatisticsPort;

pub struct CsvStatisticsAdapter {
    base_path: PathBuf,
    instrument: String,
    year: String,
    table: CsvTable,
}

impl CsvStatisticsAdapter {
    pub fn new(base_path: PathBuf, instrument: &str, year: &str) -> Self {
        Self {
            base_path,
            instrument: instrument.to_string(),
            year: year.to_string(),
            table: CsvTable::new(),
        }
    }

    pub fn with_table(mut self, table: CsvTable) -> Self {
        self.table = table;
        self
    }

    /// `{base}/{instrument}_{year}_{month}_{period}.csv`
    pub fn csv_path(&self, month: &str, period: &str) -> PathBuf {
        self.base_path.join(bucket_file_name(
            &self.instrument,
            &self.year,
            month,
            period,
        ))
    }
}

pub fn bucket_file_name(instrument: &str, year: &str, month: &str, period: &str) -> String {
    format!("{}_{}_{}_{}.csv", instrument, year, month, period)
}

impl StatisticsPort for CsvStatisticsAdapter {
    fn read_sequences(
        &self,
        month: &str,
        period: &str,
    ) -> Result<Vec<StatisticsSequence>, TreeTraderError> {
        self.table.read_records(&self.csv_path(month, period))
    }
}
