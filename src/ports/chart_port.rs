//! Chart rendering port trait.

use crate::domain::error::CryptofolioError;
use chrono::NaiveDate;

/// One named line over the chart's shared date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    /// Short identifier, usable as a file stem.
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub dates: Vec<NaiveDate>,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub name: String,
    pub title: String,
    pub y_label: String,
    pub color: String,
    pub bars: Vec<Bar>,
}

/// Port for presenting computed series.
pub trait ChartPort {
    fn render_line_chart(&self, chart: &LineChart) -> Result<(), CryptofolioError>;

    fn render_bar_chart(&self, chart: &BarChart) -> Result<(), CryptofolioError>;
}
