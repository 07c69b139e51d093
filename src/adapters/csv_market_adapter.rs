//! Forex quotes replayed from per-bucket CSV files.
//!
//! A bucket file holds one quote per line (`Timestamp,Bid,Ask`). Consecutive
//! runs of `chunk_size` quotes form the chunks the trees were trained on.

use std::collections::VecDeque;
use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::adapters::csv_statistics_adapter::bucket_file_name;
use crate::adapters::csv_table::CsvTable;
use crate::domain::error::TreeTraderError;
use crate::domain::record::{parse_value, Field, TabularRecord};
use crate::ports::market_port::MarketPort;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForexRecord {
    pub timestamp: NaiveDateTime,
    pub bid: f64,
    pub ask: f64,
}

pub fn parse_timestamp(cell: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(cell.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| format!("invalid timestamp {:?}: {}", cell, e))
}

fn set_timestamp(r: &mut ForexRecord, v: &str) -> Result<(), String> {
    r.timestamp = parse_timestamp(v)?;
    Ok(())
}

fn set_bid(r: &mut ForexRecord, v: &str) -> Result<(), String> {
    r.bid = parse_value(v)?;
    Ok(())
}

fn set_ask(r: &mut ForexRecord, v: &str) -> Result<(), String> {
    r.ask = parse_value(v)?;
    Ok(())
}

impl TabularRecord for ForexRecord {
    const FIELDS: &'static [Field<Self>] = &[
        Field { name: "timestamp", coerce: set_timestamp },
        Field { name: "bid", coerce: set_bid },
        Field { name: "ask", coerce: set_ask },
    ];
}

pub struct CsvMarketAdapter {
    base_path: PathBuf,
    instrument: String,
    year: String,
    chunk_size: usize,
    table: CsvTable,
    records: VecDeque<ForexRecord>,
}

impl CsvMarketAdapter {
    pub fn new(base_path: PathBuf, instrument: &str, year: &str, chunk_size: usize) -> Self {
        Self {
            base_path,
            instrument: instrument.to_string(),
            year: year.to_string(),
            chunk_size,
            table: CsvTable::new(),
            records: VecDeque::new(),
        }
    }

    pub fn with_table(mut self, table: CsvTable) -> Self {
        self.table = table;
        self
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl MarketPort for CsvMarketAdapter {
    type Record = ForexRecord;

    fn configure(
        &mut self,
        period: &str,
        month: &str,
        starting_chunk: i64,
    ) -> Result<(), TreeTraderError> {
        let offset = usize::try_from(starting_chunk)
            .ok()
            .and_then(|chunk| chunk.checked_mul(self.chunk_size))
            .ok_or_else(|| TreeTraderError::Market {
                reason: format!("invalid starting chunk {}", starting_chunk),
            })?;

        let path = self.base_path.join(bucket_file_name(
            &self.instrument,
            &self.year,
            month,
            period,
        ));
        let records: Vec<ForexRecord> = self.table.read_records(&path)?;

        self.records = records.into_iter().skip(offset).collect();
        Ok(())
    }

    fn has_next(&self) -> bool {
        !self.records.is_empty()
    }

    fn next_record(&mut self) -> Result<ForexRecord, TreeTraderError> {
        self.records.pop_front().ok_or_else(|| TreeTraderError::Market {
            reason: "market data exhausted".into(),
        })
    }

    fn clear(&mut self) {
        self.records.clear();
    }
}
