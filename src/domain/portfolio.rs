//! Fixed-weight buy-and-hold portfolio simulation.

use crate::domain::error::CryptofolioError;
use crate::domain::table::AssetTable;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A named set of per-asset weights. Weights are used as given; they are not
/// normalized to sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub name: String,
    pub weights: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrowthPoint {
    pub date: NaiveDate,
    pub portfolio_return: f64,
    pub growth: f64,
}

/// Per-date portfolio returns and the compounded growth of one unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioSeries {
    pub points: Vec<GrowthPoint>,
}

impl PortfolioSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn returns(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.portfolio_return).collect()
    }

    pub fn growth(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.growth).collect()
    }
}

impl Portfolio {
    /// Weights are taken as given, unchecked. Use [`Portfolio::from_aligned`]
    /// for untrusted input.
    pub fn new(name: impl Into<String>, weights: BTreeMap<String, f64>) -> Self {
        Portfolio {
            name: name.into(),
            weights,
        }
    }

    /// Pair each weight with an asset by position. Weights must be finite and
    /// non-negative.
    pub fn from_aligned(
        name: impl Into<String>,
        assets: &[String],
        weights: &[f64],
    ) -> Result<Self, CryptofolioError> {
        let name = name.into();
        if assets.len() != weights.len() {
            return Err(CryptofolioError::ConfigInvalid {
                section: "portfolios".into(),
                key: name,
                reason: format!(
                    "expected {} weights (one per ticker), got {}",
                    assets.len(),
                    weights.len()
                ),
            });
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(CryptofolioError::ConfigInvalid {
                section: "portfolios".into(),
                key: name,
                reason: format!("weight must be finite and non-negative, got {}", bad),
            });
        }
        let weights = assets.iter().cloned().zip(weights.iter().copied()).collect();
        Ok(Portfolio { name, weights })
    }

    pub fn weight(&self, asset: &str) -> Option<f64> {
        self.weights.get(asset).copied()
    }

    /// Resolve one weight per table column, failing if the weight set and the
    /// column set differ in either direction.
    fn column_weights(&self, returns: &AssetTable) -> Result<Vec<f64>, CryptofolioError> {
        let missing: Vec<String> = returns
            .columns()
            .iter()
            .filter(|c| !self.weights.contains_key(c.as_str()))
            .cloned()
            .collect();
        let unexpected: Vec<String> = self
            .weights
            .keys()
            .filter(|a| returns.column_position(a).is_none())
            .cloned()
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(CryptofolioError::MismatchedAssets {
                portfolio: self.name.clone(),
                missing,
                unexpected,
            });
        }

        Ok(returns
            .columns()
            .iter()
            .filter_map(|c| self.weight(c))
            .collect())
    }

    /// Combine per-asset returns into portfolio returns and cumulative growth.
    ///
    /// return[t] = sum(w[a] * R[t][a])
    /// growth[t] = prod(1 + return[k] for k in 0..=t)
    pub fn simulate(&self, returns: &AssetTable) -> Result<PortfolioSeries, CryptofolioError> {
        let weights = self.column_weights(returns)?;

        let mut growth = 1.0_f64;
        let points = returns
            .rows()
            .map(|(date, row)| {
                let portfolio_return: f64 = row.iter().zip(&weights).map(|(r, w)| r * w).sum();
                growth *= 1.0 + portfolio_return;
                GrowthPoint {
                    date,
                    portfolio_return,
                    growth,
                }
            })
            .collect();

        Ok(PortfolioSeries { points })
    }
}
