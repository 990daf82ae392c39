//! Wide CSV price file adapter.
//!
//! Layout: a `date` column (YYYY-MM-DD) followed by one closing-price column
//! per ticker. Empty cells are missing observations; each date may appear
//! only once.

use crate::domain::error::CryptofolioError;
use crate::domain::table::{AssetSeries, AssetTable};
use crate::ports::price_port::PricePort;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PricePort for CsvAdapter {
    fn fetch_closes(
        &self,
        tickers: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<AssetTable, CryptofolioError> {
        let content = fs::read_to_string(&self.path).map_err(|e| CryptofolioError::Provider {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| CryptofolioError::PriceParse {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();

        let positions: Vec<(String, usize)> = tickers
            .iter()
            .map(|t| {
                headers
                    .iter()
                    .position(|h| h.trim() == t)
                    .filter(|&p| p > 0)
                    .map(|p| (t.clone(), p))
                    .ok_or_else(|| CryptofolioError::Provider {
                        reason: format!("{} has no column for {}", self.path.display(), t),
                    })
            })
            .collect::<Result<_, _>>()?;

        let mut series = AssetSeries::new();
        let mut records = 0usize;
        let mut seen = BTreeSet::new();

        for result in rdr.records() {
            let record = result.map_err(|e| CryptofolioError::PriceParse {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| CryptofolioError::PriceParse {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                CryptofolioError::PriceParse {
                    reason: format!("invalid date '{}': {}", date_str, e),
                }
            })?;

            if !seen.insert(date) {
                return Err(CryptofolioError::PriceParse {
                    reason: format!("duplicate date {} in {}", date, self.path.display()),
                });
            }

            if date < start_date || date >= end_date {
                continue;
            }
            records += 1;

            for (ticker, pos) in &positions {
                let cell = record.get(*pos).unwrap_or("").trim();
                if cell.is_empty() {
                    continue;
                }
                let close: f64 = cell.parse().map_err(|e| CryptofolioError::PriceParse {
                    reason: format!("invalid close for {} on {}: {}", ticker, date, e),
                })?;
                series.entry(ticker.clone()).or_default().insert(date, close);
            }
        }

        let table = AssetTable::from_series(tickers, &series);
        debug!(
            path = %self.path.display(),
            records,
            complete = table.len(),
            "loaded price csv"
        );
        Ok(table)
    }
}

/// Write a price table in the layout [`CsvAdapter`] reads.
pub fn write_price_table(path: &Path, table: &AssetTable) -> Result<(), CryptofolioError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let csv_err = |e: csv::Error| CryptofolioError::Io(std::io::Error::other(e.to_string()));
    let mut wtr = csv::Writer::from_path(path).map_err(csv_err)?;

    let mut header = vec!["date".to_string()];
    header.extend(table.columns().iter().cloned());
    wtr.write_record(&header).map_err(csv_err)?;

    for (date, values) in table.rows() {
        let mut record = vec![date.format("%Y-%m-%d").to_string()];
        record.extend(values.iter().map(|v| v.to_string()));
        wtr.write_record(&record).map_err(csv_err)?;
    }

    wtr.flush()?;
    Ok(())
}
