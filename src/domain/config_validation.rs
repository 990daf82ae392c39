//! Configuration validation.
//!
//! Every key is optional: absent values fall back to
//! [`AnalysisConfig::default`], present values must parse and pass their
//! checks. Validation and resolution are one pass.

use crate::domain::analysis::AnalysisConfig;
use crate::domain::error::CryptofolioError;
use crate::domain::portfolio::Portfolio;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::PathBuf;

pub const PROVIDER_SOURCES: [&str; 2] = ["yahoo", "csv"];

/// Where closing prices come from, per `[provider]`.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceSource {
    Yahoo,
    Csv(PathBuf),
}

/// Validate every section and return the resolved analysis parameters and
/// price source.
pub fn validate_analysis_config(
    config: &dyn ConfigPort,
) -> Result<(AnalysisConfig, PriceSource), CryptofolioError> {
    let analysis = resolve_analysis_config(config)?;
    let source = resolve_price_source(config)?;
    Ok((analysis, source))
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> CryptofolioError {
    CryptofolioError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Resolve `[analysis]` and `[portfolios]`.
pub fn resolve_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, CryptofolioError> {
    let defaults = AnalysisConfig::default();

    let risk_free_rate = match config.get_string("analysis", "risk_free_rate") {
        Some(raw) => parse_risk_free_rate(&raw)?,
        None => defaults.risk_free_rate,
    };

    let start_date = config
        .get_string("analysis", "start_date")
        .map(|s| parse_date(&s, "start_date"))
        .transpose()?
        .unwrap_or(defaults.start_date);
    let end_date = config
        .get_string("analysis", "end_date")
        .map(|s| parse_date(&s, "end_date"))
        .transpose()?
        .unwrap_or(defaults.end_date);
    if start_date >= end_date {
        return Err(invalid(
            "analysis",
            "start_date",
            format!("start_date {} must be before end_date {}", start_date, end_date),
        ));
    }

    let custom_tickers = config
        .get_string("analysis", "tickers")
        .map(|s| parse_tickers(&s))
        .transpose()?;
    let has_custom_tickers = custom_tickers.is_some();
    let tickers = custom_tickers.unwrap_or(defaults.tickers);

    let names = config.section_keys("portfolios");
    let portfolios = if names.is_empty() {
        // Built-in portfolios are defined against the default tickers only.
        if has_custom_tickers {
            return Err(CryptofolioError::ConfigMissing {
                section: "portfolios".to_string(),
                key: "<portfolio name>".to_string(),
            });
        }
        defaults.portfolios
    } else {
        names
            .iter()
            .map(|name| {
                let raw = config.get_string("portfolios", name).unwrap_or_default();
                let weights = parse_weights(name, &raw)?;
                Portfolio::from_aligned(name.as_str(), &tickers, &weights)
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(AnalysisConfig {
        tickers,
        start_date,
        end_date,
        risk_free_rate,
        portfolios,
    })
}

/// An annual rate in [0, 1). Anything that is not a plain number is
/// rejected rather than replaced by the default.
pub fn parse_risk_free_rate(raw: &str) -> Result<f64, CryptofolioError> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        invalid(
            "analysis",
            "risk_free_rate",
            format!("'{}' is not a number", raw.trim()),
        )
    })?;
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "analysis",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(value)
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, CryptofolioError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        invalid(
            "analysis",
            field,
            format!("invalid {} format, expected YYYY-MM-DD", field),
        )
    })
}

/// Split a comma-separated ticker list. Tickers are upper-cased; empty
/// entries and duplicates are rejected.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, CryptofolioError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let ticker = token.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(invalid("analysis", "tickers", "empty token in ticker list"));
        }
        if !seen.insert(ticker.clone()) {
            return Err(invalid(
                "analysis",
                "tickers",
                format!("duplicate ticker: {}", ticker),
            ));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

/// Parse a comma-separated weight list. Range checks happen in
/// [`Portfolio::from_aligned`].
pub fn parse_weights(name: &str, input: &str) -> Result<Vec<f64>, CryptofolioError> {
    input
        .split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse()
                .map_err(|_| invalid("portfolios", name, format!("invalid weight '{}'", token)))
        })
        .collect()
}

/// Resolve `[provider]`; `source` defaults to `yahoo`.
pub fn resolve_price_source(config: &dyn ConfigPort) -> Result<PriceSource, CryptofolioError> {
    let source = config
        .get_string("provider", "source")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| "yahoo".to_string());

    match source.as_str() {
        "yahoo" => Ok(PriceSource::Yahoo),
        "csv" => match config.get_string("provider", "csv_path") {
            Some(p) if !p.trim().is_empty() => Ok(PriceSource::Csv(PathBuf::from(p.trim()))),
            _ => Err(CryptofolioError::ConfigMissing {
                section: "provider".to_string(),
                key: "csv_path".to_string(),
            }),
        },
        other => Err(invalid(
            "provider",
            "source",
            format!(
                "unknown source '{}', expected one of {}",
                other,
                PROVIDER_SOURCES.join(", ")
            ),
        )),
    }
}
