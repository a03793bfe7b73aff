//! CSV file data adapter.
//!
//! One file per symbol, `<CODE>.csv`, with a header row and the columns
//! `date,open,high,low,close,volume`. Rows are returned in file order.

use crate::domain::error::SigscanError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{code}.csv"))
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    column: usize,
    name: &str,
    code: &str,
    index: usize,
) -> Result<&'r str, SigscanError> {
    match record.get(column).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(SigscanError::InvalidBar {
            code: code.to_string(),
            index,
            reason: format!("missing {name} column"),
        }),
    }
}

fn price(
    record: &csv::StringRecord,
    column: usize,
    name: &str,
    code: &str,
    index: usize,
) -> Result<f64, SigscanError> {
    field(record, column, name, code, index)?
        .parse()
        .map_err(|e| SigscanError::InvalidBar {
            code: code.to_string(),
            index,
            reason: format!("invalid {name} value: {e}"),
        })
}

/// Volumes are integers, but some exports write them as `1234.0`.
fn volume(record: &csv::StringRecord, code: &str, index: usize) -> Result<i64, SigscanError> {
    let raw = field(record, 5, "volume", code, index)?;
    raw.parse::<i64>()
        .or_else(|_| raw.parse::<f64>().map(|v| v.round() as i64))
        .map_err(|e| SigscanError::InvalidBar {
            code: code.to_string(),
            index,
            reason: format!("invalid volume value: {e}"),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, SigscanError> {
        let path = self.csv_path(code);
        let content = fs::read_to_string(&path).map_err(|e| SigscanError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| SigscanError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let date_str = field(&record, 0, "date", code, index)?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SigscanError::InvalidBar {
                    code: code.to_string(),
                    index,
                    reason: format!("invalid date format: {e}"),
                }
            })?;

            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            bars.push(OhlcvBar {
                date,
                open: price(&record, 1, "open", code, index)?,
                high: price(&record, 2, "high", code, index)?,
                low: price(&record, 3, "low", code, index)?,
                close: price(&record, 4, "close", code, index)?,
                volume: volume(&record, code, index)?,
            });
        }

        log::debug!("read {} bars for {} from {}", bars.len(), code, path.display());
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SigscanError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SigscanError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| SigscanError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(code) = name_str.strip_suffix(".csv") {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000.0\n";

        fs::write(path.join("2330.TW.csv"), csv_content).unwrap();
        fs::write(path.join("AAPL.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(path.join("notes.txt"), "not a price file").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_ohlcv_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_ohlcv("2330.TW", None, None).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[2].volume, 55000);
    }

    #[test]
    fn fetch_ohlcv_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let day = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let bars = adapter.fetch_ohlcv("2330.TW", Some(day), Some(day)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, day);

        let bars = adapter.fetch_ohlcv("2330.TW", Some(day), None).unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[test]
    fn fetch_ohlcv_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch_ohlcv("XYZ", None, None).unwrap_err();
        assert!(matches!(err, SigscanError::Data { .. }));
    }

    #[test]
    fn rows_keep_file_order() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("REV.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-17,1,1,1,1,1\n\
             2024-01-15,2,2,2,2,2\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let bars = adapter.fetch_ohlcv("REV", None, None).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
    }

    #[test]
    fn missing_field_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("GAP.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-15,1,1,1,1,1\n\
             2024-01-16,2,2,,2,2\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        let err = adapter.fetch_ohlcv("GAP", None, None).unwrap_err();
        assert!(matches!(
            err,
            SigscanError::InvalidBar { index: 1, ref reason, .. } if reason.contains("low")
        ));
    }

    #[test]
    fn list_symbols_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let symbols = adapter.list_symbols().unwrap();
        assert_eq!(symbols, vec!["2330.TW", "AAPL"]);
    }
}
