//! Date-indexed table with named asset columns.
//!
//! Backs both the price table and the return table. Rows are kept in strictly
//! ascending date order with one value per column; lookups go through the
//! column name and the date index.

use crate::domain::error::CryptofolioError;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct AssetTable {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<f64>>,
}

/// Closing prices keyed by asset, then by date.
pub type AssetSeries = BTreeMap<String, BTreeMap<NaiveDate, f64>>;

impl AssetTable {
    pub fn new(columns: Vec<String>) -> Self {
        let column_index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            columns,
            column_index,
            dates: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Build a table from rows already known to be ordered and aligned with
    /// `columns`.
    pub(crate) fn from_aligned(
        columns: Vec<String>,
        dates: Vec<NaiveDate>,
        rows: Vec<Vec<f64>>,
    ) -> Self {
        debug_assert_eq!(dates.len(), rows.len());
        let mut table = Self::new(columns);
        table.dates = dates;
        table.rows = rows;
        table
    }

    /// Align per-asset series on their common dates.
    ///
    /// The timeline is the union of all dates; any date where one of `columns`
    /// has no observation (or a non-finite one) is dropped.
    pub fn from_series(columns: &[String], series: &AssetSeries) -> Self {
        let mut table = Self::new(columns.to_vec());

        let timeline: BTreeSet<NaiveDate> = columns
            .iter()
            .filter_map(|c| series.get(c))
            .flat_map(|s| s.keys().copied())
            .collect();

        for date in timeline {
            let row: Option<Vec<f64>> = columns
                .iter()
                .map(|c| {
                    series
                        .get(c)
                        .and_then(|s| s.get(&date))
                        .copied()
                        .filter(|v| v.is_finite())
                })
                .collect();
            if let Some(values) = row {
                table.dates.push(date);
                table.rows.push(values);
            }
        }

        table
    }

    /// Append a row. Dates must be strictly increasing and the row must
    /// have one value per column.
    pub fn push_row(&mut self, date: NaiveDate, values: Vec<f64>) -> Result<(), CryptofolioError> {
        if values.len() != self.columns.len() {
            return Err(CryptofolioError::InvalidTable {
                date,
                reason: format!(
                    "expected {} values, got {}",
                    self.columns.len(),
                    values.len()
                ),
            });
        }
        if let Some(&last) = self.dates.last() {
            if date <= last {
                return Err(CryptofolioError::InvalidTable {
                    date,
                    reason: format!("date is not after previous row {}", last),
                });
            }
        }
        self.dates.push(date);
        self.rows.push(values);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_position(&self, asset: &str) -> Option<usize> {
        self.column_index.get(asset).copied()
    }

    pub fn get(&self, date: NaiveDate, asset: &str) -> Option<f64> {
        let col = self.column_position(asset)?;
        let row = self.dates.binary_search(&date).ok()?;
        Some(self.rows[row][col])
    }

    pub fn column(&self, asset: &str) -> Option<Vec<f64>> {
        let col = self.column_position(asset)?;
        Some(self.rows.iter().map(|r| r[col]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &[f64])> {
        self.dates
            .iter()
            .copied()
            .zip(self.rows.iter().map(Vec::as_slice))
    }

    /// Restrict the table to the given columns, in the given order.
    /// Returns `None` if any requested column is absent.
    pub fn select(&self, columns: &[String]) -> Option<Self> {
        let positions: Vec<usize> = columns
            .iter()
            .map(|c| self.column_position(c))
            .collect::<Option<_>>()?;
        let mut table = Self::new(columns.to_vec());
        table.dates = self.dates.clone();
        table.rows = self
            .rows
            .iter()
            .map(|r| positions.iter().map(|&p| r[p]).collect())
            .collect();
        Some(table)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}
