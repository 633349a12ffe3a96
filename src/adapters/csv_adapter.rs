//! CSV file price adapter.
//!
//! One `<SYMBOL>.csv` per symbol, with a header naming a `date` column
//! (`YYYY-MM-DD`) and a `close` or `price` column.

use crate::domain::error::StocksimError;
use crate::ports::price_port::{PricePoint, PricePort};
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvPriceAdapter {
    base_path: PathBuf,
}

impl CsvPriceAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn column_index(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

impl PricePort for CsvPriceAdapter {
    fn list_symbols(&self) -> Result<Vec<String>, StocksimError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StocksimError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StocksimError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                symbols.push(stem.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn fetch_prices(&self, symbol: &str) -> Result<Vec<PricePoint>, StocksimError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| StocksimError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| StocksimError::Data {
                reason: format!("CSV header error in {}: {}", path.display(), e),
            })?
            .clone();
        let date_col = column_index(&headers, &["date"]).ok_or_else(|| StocksimError::Data {
            reason: format!("missing date column in {}", path.display()),
        })?;
        let price_col =
            column_index(&headers, &["close", "price"]).ok_or_else(|| StocksimError::Data {
                reason: format!("missing close/price column in {}", path.display()),
            })?;

        let mut points = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| StocksimError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_col).ok_or_else(|| StocksimError::Data {
                reason: "missing date value".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                StocksimError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            let price: f64 = record
                .get(price_col)
                .ok_or_else(|| StocksimError::Data {
                    reason: "missing price value".into(),
                })?
                .trim()
                .parse()
                .map_err(|e| StocksimError::Data {
                    reason: format!("invalid price value: {}", e),
                })?;

            points.push(PricePoint { date, price });
        }

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}
