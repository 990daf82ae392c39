//! Analysis pipeline: prices -> returns -> per-portfolio series -> metrics.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::error::CryptofolioError;
use crate::domain::metrics::{DEFAULT_RISK_FREE_RATE, PortfolioMetrics};
use crate::domain::portfolio::{Portfolio, PortfolioSeries};
use crate::domain::returns::compute_returns;
use crate::domain::table::AssetTable;
use crate::ports::price_port::PricePort;

/// Two prices are needed for a single return.
pub const MIN_PRICE_ROWS: usize = 2;

pub const DEFAULT_TICKERS: [&str; 5] = ["BTC-USD", "ETH-USD", "SOL-USD", "DOGE-USD", "USDT-USD"];

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    /// Exclusive.
    pub end_date: NaiveDate,
    pub risk_free_rate: f64,
    pub portfolios: Vec<Portfolio>,
}

impl AnalysisConfig {
    pub fn default_portfolios(tickers: &[String]) -> Vec<Portfolio> {
        let third = 1.0 / 3.0;
        [
            ("100% BTC", [1.0, 0.0, 0.0, 0.0, 0.0]),
            ("50% BTC + 50% ETH", [0.5, 0.5, 0.0, 0.0, 0.0]),
            ("33% BTC + 33% ETH + 33% SOL", [third, third, third, 0.0, 0.0]),
        ]
        .into_iter()
        .map(|(name, weights)| Portfolio {
            name: name.to_string(),
            weights: tickers.iter().cloned().zip(weights).collect(),
        })
        .collect()
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let tickers: Vec<String> = DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect();
        let portfolios = Self::default_portfolios(&tickers);
        AnalysisConfig {
            tickers,
            start_date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap_or_default(),
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            portfolios,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortfolioResult {
    pub name: String,
    pub series: PortfolioSeries,
    pub metrics: PortfolioMetrics,
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub price_rows: usize,
    pub returns: AssetTable,
    pub results: Vec<PortfolioResult>,
}

impl AnalysisReport {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.returns.first_date()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.returns.last_date()
    }
}

/// Evaluate every portfolio against one return table. Stops at the first
/// portfolio whose weights do not match the table's assets.
pub fn evaluate_portfolios(
    returns: &AssetTable,
    portfolios: &[Portfolio],
    risk_free_rate: f64,
) -> Result<Vec<PortfolioResult>, CryptofolioError> {
    portfolios
        .iter()
        .map(|portfolio| {
            let series = portfolio.simulate(returns)?;
            let metrics = PortfolioMetrics::compute(&series, risk_free_rate);
            debug!(
                portfolio = %portfolio.name,
                sharpe = metrics.sharpe_ratio,
                max_drawdown = metrics.max_drawdown,
                "portfolio evaluated"
            );
            Ok(PortfolioResult {
                name: portfolio.name.clone(),
                series,
                metrics,
            })
        })
        .collect()
}

pub fn run_analysis(
    price_port: &dyn PricePort,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, CryptofolioError> {
    info!(
        tickers = %config.tickers.join(","),
        start = %config.start_date,
        end = %config.end_date,
        "fetching closing prices"
    );
    let prices = price_port.fetch_closes(&config.tickers, config.start_date, config.end_date)?;
    info!(rows = prices.len(), "complete price rows after cleaning");

    if prices.len() < MIN_PRICE_ROWS {
        return Err(CryptofolioError::InsufficientData {
            rows: prices.len(),
            minimum: MIN_PRICE_ROWS,
        });
    }

    let returns = compute_returns(&prices);
    let results = evaluate_portfolios(&returns, &config.portfolios, config.risk_free_rate)?;

    Ok(AnalysisReport {
        price_rows: prices.len(),
        returns,
        results,
    })
}
