#![allow(dead_code)]

use chrono::NaiveDate;
use cryptofolio::domain::error::CryptofolioError;
use cryptofolio::domain::table::{AssetSeries, AssetTable};
use cryptofolio::ports::chart_port::{BarChart, ChartPort, LineChart};
use cryptofolio::ports::price_port::PricePort;
use std::cell::RefCell;
use std::collections::BTreeMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn tickers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Consecutive daily closes for one asset, starting at `start`.
pub fn daily(start: NaiveDate, closes: &[f64]) -> BTreeMap<NaiveDate, f64> {
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| (start + chrono::Days::new(i as u64), *c))
        .collect()
}

/// Build a table from rows of `(date, values)` in column order.
pub fn make_table(columns: &[&str], rows: &[(NaiveDate, Vec<f64>)]) -> AssetTable {
    let mut table = AssetTable::new(tickers(columns));
    for (d, values) in rows {
        table.push_row(*d, values.clone()).unwrap();
    }
    table
}

/// Serves fixed per-asset series and records every request.
pub struct MockPricePort {
    pub series: AssetSeries,
    pub error: Option<String>,
    pub requests: RefCell<Vec<(Vec<String>, NaiveDate, NaiveDate)>>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            series: AssetSeries::new(),
            error: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_series(mut self, ticker: &str, closes: BTreeMap<NaiveDate, f64>) -> Self {
        self.series.insert(ticker.to_string(), closes);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_closes(
        &self,
        tickers: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<AssetTable, CryptofolioError> {
        self.requests
            .borrow_mut()
            .push((tickers.to_vec(), start_date, end_date));
        if let Some(reason) = &self.error {
            return Err(CryptofolioError::Provider {
                reason: reason.clone(),
            });
        }
        let in_range: AssetSeries = self
            .series
            .iter()
            .map(|(t, s)| {
                let kept = s
                    .iter()
                    .filter(|(d, _)| **d >= start_date && **d < end_date)
                    .map(|(d, c)| (*d, *c))
                    .collect();
                (t.clone(), kept)
            })
            .collect();
        Ok(AssetTable::from_series(tickers, &in_range))
    }
}

#[derive(Default)]
pub struct RecordingChartPort {
    pub lines: RefCell<Vec<LineChart>>,
    pub bars: RefCell<Vec<BarChart>>,
}

impl ChartPort for RecordingChartPort {
    fn render_line_chart(&self, chart: &LineChart) -> Result<(), CryptofolioError> {
        self.lines.borrow_mut().push(chart.clone());
        Ok(())
    }

    fn render_bar_chart(&self, chart: &BarChart) -> Result<(), CryptofolioError> {
        self.bars.borrow_mut().push(chart.clone());
        Ok(())
    }
}
