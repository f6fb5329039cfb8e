//! CSV file data adapter.
//!
//! One `{SYMBOL}.csv` file per symbol under a base directory, with a
//! `date,open,high,low,close,volume` header row. Rows may be unsorted
//! on disk; fetches come back date-ordered.

use crate::domain::error::MarketlensError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

#[derive(Debug)]
pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, MarketlensError> {
    record.get(index).ok_or_else(|| MarketlensError::Data {
        reason: format!("missing {} column", name),
    })
}

fn numeric_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, MarketlensError> {
    field(record, index, name)?
        .parse()
        .map_err(|e| MarketlensError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, MarketlensError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| MarketlensError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in reader.records() {
            let record = result.map_err(|e| MarketlensError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                MarketlensError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(PriceBar {
                date,
                open: numeric_field(&record, 1, "open")?,
                high: numeric_field(&record, 2, "high")?,
                low: numeric_field(&record, 3, "low")?,
                close: numeric_field(&record, 4, "close")?,
                volume: numeric_field(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MarketlensError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| MarketlensError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MarketlensError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".csv") {
                symbols.push(stem.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, MarketlensError> {
        if !self.csv_path(symbol).exists() {
            return Ok(None);
        }
        let bars = self.fetch_bars(symbol, NaiveDate::MIN, NaiveDate::MAX)?;
        Ok(bars
            .first()
            .zip(bars.last())
            .map(|(first, last)| (first.date, last.date, bars.len())))
    }
}
