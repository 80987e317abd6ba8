//! CSV file data adapter.
//!
//! Reads `timestamp,open,high,low,close` rows. Timestamps accept either
//! `YYYY-MM-DD HH:MM:SS` or the ISO-8601 `T` separator; bare dates are
//! taken as midnight. Rows are sorted by timestamp before being returned.

use crate::domain::error::VoltraderError;
use crate::domain::ohlc::Bar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    fn parse_price(
        record: &csv::StringRecord,
        index: usize,
        name: &str,
        row: usize,
    ) -> Result<f64, VoltraderError> {
        record
            .get(index)
            .ok_or_else(|| VoltraderError::Data {
                reason: format!("row {}: missing {} column", row, name),
            })?
            .trim()
            .parse()
            .map_err(|_| VoltraderError::Data {
                reason: format!("row {}: invalid {} value", row, name),
            })
    }
}

impl DataPort for CsvAdapter {
    fn load_bars(&self) -> Result<Vec<Bar>, VoltraderError> {
        let content = fs::read_to_string(&self.path).map_err(|e| VoltraderError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| VoltraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let ts_raw = record.get(0).ok_or_else(|| VoltraderError::Data {
                reason: format!("row {}: missing timestamp column", row),
            })?;
            let time = Self::parse_timestamp(ts_raw.trim()).ok_or_else(|| {
                VoltraderError::Data {
                    reason: format!("row {}: invalid timestamp '{}'", row, ts_raw),
                }
            })?;

            bars.push(Bar {
                time,
                open: Self::parse_price(&record, 1, "open", row)?,
                high: Self::parse_price(&record, 2, "high", row)?,
                low: Self::parse_price(&record, 3, "low", row)?,
                close: Self::parse_price(&record, 4, "close", row)?,
            });
        }

        bars.sort_by_key(|b| b.time);
        Ok(bars)
    }
}
