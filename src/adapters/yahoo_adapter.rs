//! Yahoo Finance chart API price adapter.
//!
//! One blocking request per ticker against `/v8/finance/chart/{ticker}` with
//! a daily interval. No retries: the first failure aborts the fetch.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::error::CryptofolioError;
use crate::domain::table::{AssetSeries, AssetTable};
use crate::ports::price_port::PricePort;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

/// Decode a chart response body into daily closes keyed by UTC date.
/// Null closes are skipped.
pub fn parse_chart_response(
    ticker: &str,
    body: &str,
) -> Result<BTreeMap<NaiveDate, f64>, CryptofolioError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| CryptofolioError::PriceParse {
            reason: format!("failed to parse chart response for {}: {}", ticker, e),
        })?;

    if let Some(error) = response.chart.error {
        return Err(CryptofolioError::Provider {
            reason: format!("{}: {} - {}", ticker, error.code, error.description),
        });
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| CryptofolioError::Provider {
            reason: format!("no data returned for {}", ticker),
        })?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .and_then(|q| q.close)
        .unwrap_or_default();

    let mut series = BTreeMap::new();
    for (ts, close) in timestamps.iter().zip(closes) {
        let Some(close) = close else { continue };
        let date = DateTime::from_timestamp(*ts, 0)
            .ok_or_else(|| CryptofolioError::PriceParse {
                reason: format!("invalid timestamp {} for {}", ts, ticker),
            })?
            .date_naive();
        series.insert(date, close);
    }

    Ok(series)
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

pub struct YahooAdapter {
    client: Client,
    base_url: String,
}

impl YahooAdapter {
    pub fn new() -> Result<Self, CryptofolioError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, CryptofolioError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CryptofolioError::Provider {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn chart_url(&self, ticker: &str, start_date: NaiveDate, end_date: NaiveDate) -> String {
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url,
            ticker,
            unix_midnight(start_date),
            unix_midnight(end_date),
        )
    }

    fn fetch_ticker(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>, CryptofolioError> {
        let url = self.chart_url(ticker, start_date, end_date);
        debug!(%url, "requesting chart");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| CryptofolioError::Provider {
                reason: format!("request for {} failed: {}", ticker, e),
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| CryptofolioError::Provider {
            reason: format!("failed to read response for {}: {}", ticker, e),
        })?;

        // Yahoo reports unknown symbols as 404 with a chart.error payload.
        if !status.is_success() {
            return match parse_chart_response(ticker, &body) {
                Err(e @ CryptofolioError::Provider { .. }) => Err(e),
                _ => Err(CryptofolioError::Provider {
                    reason: format!("{}: HTTP {}", ticker, status),
                }),
            };
        }

        let series = parse_chart_response(ticker, &body)?;
        // Keep the range half-open whatever the provider returns at period2.
        Ok(series
            .into_iter()
            .filter(|(d, _)| *d >= start_date && *d < end_date)
            .collect())
    }
}

impl PricePort for YahooAdapter {
    fn fetch_closes(
        &self,
        tickers: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<AssetTable, CryptofolioError> {
        let mut series = AssetSeries::new();
        for ticker in tickers {
            let closes = self.fetch_ticker(ticker, start_date, end_date)?;
            info!(ticker = %ticker, closes = closes.len(), "fetched closing prices");
            series.insert(ticker.clone(), closes);
        }
        Ok(AssetTable::from_series(tickers, &series))
    }
}
