//! Delimited text loader: turns a file into [`RawRow`]s and typed records.

use std::fs::File;
use std::path::Path;

use crate::domain::error::TreeTraderError;
use crate::domain::record::{normalize, RawRow, TabularRecord, DEFAULT_SKIP};

#[derive(Debug, Clone, Copy)]
pub struct CsvTable {
    delimiter: u8,
    skip: usize,
}

impl Default for CsvTable {
    fn default() -> Self {
        Self {
            delimiter: b',',
            skip: DEFAULT_SKIP,
        }
    }
}

impl CsvTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Leading rows ignored by [`CsvTable::read_records`].
    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    /// Read every non-blank line of `path`. Quoted fields may contain the
    /// delimiter; rows may have differing cell counts.
    pub fn load(&self, path: &Path) -> Result<Vec<RawRow>, TreeTraderError> {
        if path.as_os_str().is_empty() {
            return Err(TreeTraderError::DataAccess {
                path: String::new(),
                reason: "empty path provided".into(),
            });
        }
        if !path.is_file() {
            return Err(data_access(path, "file does not exist"));
        }

        let file = File::open(path).map_err(|e| data_access(path, e))?;
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| data_access(path, e))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            rows.push(RawRow::new(line, record.iter().map(str::to_string).collect()));
        }
        Ok(rows)
    }

    /// Load `path` and bind every row after the skipped ones onto `T`.
    pub fn read_records<T: TabularRecord>(&self, path: &Path) -> Result<Vec<T>, TreeTraderError> {
        let rows = self.load(path)?;
        normalize(&rows, self.skip)
    }
}

fn data_access(path: &Path, reason: impl ToString) -> TreeTraderError {
    TreeTraderError::DataAccess {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::statistics::StatisticsSequence;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_splits_lines_into_cells() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.csv", "Chunk,Cases\n1,100\n2,200\n");
        let rows = CsvTable::new().load(&path).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cells, vec!["Chunk", "Cases"]);
        assert_eq!(rows[2].cells, vec!["2", "200"]);
        assert_eq!(rows[2].line, 3);
    }

    #[test]
    fn quoted_cells_keep_delimiter() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "q.csv", "name,value\n\"a,b\",1\n");
        let rows = CsvTable::new().load(&path).unwrap();
        assert_eq!(rows[1].cells, vec!["a,b", "1"]);
    }

    #[test]
    fn custom_delimiter() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "s.csv", "a;b\n1;2,5\n");
        let rows = CsvTable::new().with_delimiter(b';').load(&path).unwrap();
        assert_eq!(rows[1].cells, vec!["1", "2,5"]);
    }

    #[test]
    fn ragged_rows_are_loaded() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "r.csv", "a,b,c\n1\n");
        let rows = CsvTable::new().load(&path).unwrap();
        assert_eq!(rows[1].cells, vec!["1"]);
    }

    #[test]
    fn empty_path_is_data_access_error() {
        let err = CsvTable::new().load(Path::new("")).unwrap_err();
        assert!(matches!(err, TreeTraderError::DataAccess { .. }));
    }

    #[test]
    fn missing_file_is_data_access_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.csv");
        let err = CsvTable::new().load(&missing).unwrap_err();
        match err {
            TreeTraderError::DataAccess { path, reason } => {
                assert!(path.ends_with("nope.csv"));
                assert_eq!(reason, "file does not exist");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_records_skips_header() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "stats.csv",
            "Chunk,Cases,C45Errors,C50Errors\n0,120,12,10\n1,80,4,8\n",
        );
        let records: Vec<StatisticsSequence> = CsvTable::new().read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].chunk, 1);
        assert_eq!(records[1].c50_errors, 8);
    }

    #[test]
    fn read_records_without_header() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "raw.csv", "0,120,12,10\n");
        let records: Vec<StatisticsSequence> =
            CsvTable::new().with_skip(0).read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cases, 120);
    }

    #[test]
    fn read_records_reports_short_row() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.csv", "Chunk,Cases,C45Errors,C50Errors\n0,120,12\n");
        let err = CsvTable::new()
            .read_records::<StatisticsSequence>(&path)
            .unwrap_err();
        assert!(matches!(
            err,
            TreeTraderError::SchemaMismatch { line: 2, ref field, .. } if field == "c50_errors"
        ));
    }
}
