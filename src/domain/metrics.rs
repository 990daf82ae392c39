//! Performance metrics over portfolio series.

use super::portfolio::PortfolioSeries;

/// Crypto markets trade every calendar day.
pub const PERIODS_PER_YEAR: f64 = 365.0;

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.005;

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioMetrics {
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub total_return: f64,
}

impl PortfolioMetrics {
    pub fn compute(series: &PortfolioSeries, risk_free_rate: f64) -> Self {
        let growth = series.growth();
        PortfolioMetrics {
            sharpe_ratio: sharpe_ratio(&series.returns(), risk_free_rate),
            max_drawdown: max_drawdown(&growth),
            total_return: total_return(&growth),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn sample_stddev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() as f64 - 1.0);
    variance.sqrt()
}

/// Annualized Sharpe ratio of daily returns.
///
/// sqrt(365) * (mean - rf / 365) / stddev
///
/// A zero standard deviation is not special-cased: the result is infinite or
/// NaN, as is the result for fewer than two returns.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let excess = mean(returns) - risk_free_rate / PERIODS_PER_YEAR;
    PERIODS_PER_YEAR.sqrt() * excess / sample_stddev(returns)
}

/// Most negative peak-to-trough decline of a growth series, as a fraction of
/// the running peak. Zero for a non-decreasing or empty series.
pub fn max_drawdown(growth: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for &value in growth {
        if value > peak {
            peak = value;
        }
        let dd = (value - peak) / peak;
        if dd < max_dd {
            max_dd = dd;
        }
    }

    max_dd
}

/// Final growth minus one.
pub fn total_return(growth: &[f64]) -> f64 {
    growth.last().map(|g| g - 1.0).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::GrowthPoint;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_series(returns: &[f64]) -> PortfolioSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut growth = 1.0;
        PortfolioSeries {
            points: returns
                .iter()
                .enumerate()
                .map(|(i, &r)| {
                    growth *= 1.0 + r;
                    GrowthPoint {
                        date: start + chrono::Duration::days(i as i64),
                        portfolio_return: r,
                        growth,
                    }
                })
                .collect(),
        }
    }

    #[test]
    fn max_drawdown_halving() {
        assert_eq!(max_drawdown(&[1.0, 0.5]), -0.5);
    }

    #[test]
    fn max_drawdown_strictly_increasing_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 1.1, 1.2, 1.5, 2.0]), 0.0);
    }

    #[test]
    fn max_drawdown_flat_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 1.0, 1.0]), 0.0);
    }

    #[test]
    fn max_drawdown_empty_is_zero() {
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn max_drawdown_uses_running_peak() {
        let growth = [1.0, 1.1, 0.9, 0.95, 0.8, 1.0];
        assert_relative_eq!(max_drawdown(&growth), (0.8 - 1.1) / 1.1, epsilon = 1e-12);
    }

    #[test]
    fn max_drawdown_later_smaller_dip_does_not_override() {
        let growth = [2.0, 1.0, 3.0, 2.7];
        assert_relative_eq!(max_drawdown(&growth), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn sharpe_ratio_known_value() {
        let returns = [0.01, -0.02, 0.03, 0.0];
        let m = 0.005;
        let var = ((0.005_f64).powi(2)
            + (0.025_f64).powi(2)
            + (0.025_f64).powi(2)
            + (0.005_f64).powi(2))
            / 3.0;
        let expected = 365.0_f64.sqrt() * (m - 0.005 / 365.0) / var.sqrt();
        assert_relative_eq!(
            sharpe_ratio(&returns, DEFAULT_RISK_FREE_RATE),
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn sharpe_ratio_zero_rate_sign_follows_mean() {
        assert!(sharpe_ratio(&[0.02, -0.01, 0.03], 0.0) > 0.0);
        assert!(sharpe_ratio(&[-0.02, 0.01, -0.03], 0.0) < 0.0);
    }

    #[test]
    fn sharpe_ratio_constant_series_is_not_finite() {
        let sharpe = sharpe_ratio(&[0.5, 0.5, 0.5, 0.5], DEFAULT_RISK_FREE_RATE);
        assert!(!sharpe.is_finite());
        assert!(sharpe.is_infinite() && sharpe > 0.0);
    }

    #[test]
    fn sharpe_ratio_constant_at_risk_free_is_nan() {
        let sharpe = sharpe_ratio(&[0.0, 0.0, 0.0], 0.0);
        assert!(sharpe.is_nan());
    }

    #[test]
    fn sharpe_ratio_single_return_is_nan() {
        assert!(sharpe_ratio(&[0.01], DEFAULT_RISK_FREE_RATE).is_nan());
    }

    #[test]
    fn total_return_from_growth() {
        assert_relative_eq!(total_return(&[1.06, 1.0494]), 0.0494, epsilon = 1e-12);
        assert_eq!(total_return(&[]), 0.0);
    }

    #[test]
    fn compute_uses_returns_and_growth() {
        let series = make_series(&[0.10, -0.20, 0.05]);
        let metrics = PortfolioMetrics::compute(&series, DEFAULT_RISK_FREE_RATE);

        assert_relative_eq!(
            metrics.sharpe_ratio,
            sharpe_ratio(&[0.10, -0.20, 0.05], DEFAULT_RISK_FREE_RATE),
            epsilon = 1e-12
        );
        assert_relative_eq!(metrics.max_drawdown, -0.20, epsilon = 1e-12);
        assert_relative_eq!(metrics.total_return, 1.1 * 0.8 * 1.05 - 1.0, epsilon = 1e-12);
    }
}
