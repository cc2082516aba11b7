//! Performance metrics — pure functions over a PNL series.
//!
//! Every metric is a pure function: numeric series in, scalar out. The
//! dashboard cards are built from [`PerformanceSummary::compute`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::PnlSeries;

/// Periods per year used when annualizing daily Sharpe ratios.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Capital the cumulative PNL is measured against when none is configured.
pub const DEFAULT_INITIAL_CAPITAL: f64 = 1_000_000.0;

/// Relative tolerance under which a standard deviation counts as zero.
const ZERO_VARIANCE_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    #[error("need at least {needed} observations, got {got}")]
    TooFewObservations { needed: usize, got: usize },

    #[error("returns have zero variance")]
    ZeroVariance,

    #[error("non-finite value at index {index}")]
    NonFinite { index: usize },

    #[error("annualization periods must be positive and finite, got {0}")]
    InvalidAnnualization(f64),
}

/// Inputs that are not part of the series itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsOptions {
    pub initial_capital: f64,
    /// Periods per year; `None` reports the per-period ratio.
    pub annualization_periods: Option<f64>,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            annualization_periods: Some(TRADING_DAYS_PER_YEAR),
        }
    }
}

/// The three headline numbers for one PNL series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Final cumulative PNL over initial capital, as a fraction.
    pub cumulative_return: f64,
    /// `None` when the return series is too short or flat.
    pub sharpe: Option<f64>,
    /// Largest peak-to-trough decline of `total_value`, as a positive fraction.
    pub max_drawdown: f64,
    /// Number of period returns the Sharpe ratio was computed from.
    pub return_observations: usize,
}

impl PerformanceSummary {
    pub fn compute(series: &PnlSeries, opts: &MetricsOptions) -> Self {
        let returns = period_returns(series);
        let sharpe = match sharpe_ratio(&returns, opts.annualization_periods) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::debug!(error = %e, "sharpe ratio undefined");
                None
            }
        };
        Self {
            cumulative_return: cumulative_return(&series.cumulative_pnl(), opts.initial_capital),
            sharpe,
            max_drawdown: max_drawdown(&series.total_values()),
            return_observations: returns.len(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Sharpe ratio: mean(returns) / std(returns), times sqrt(periods) when annualized.
///
/// Uses the sample standard deviation. Fails with fewer than two returns,
/// zero variance, or any non-finite input. Multiplying every return by the
/// same positive constant leaves the result unchanged.
pub fn sharpe_ratio(returns: &[f64], annualization_periods: Option<f64>) -> Result<f64, MetricError> {
    if let Some(index) = returns.iter().position(|r| !r.is_finite()) {
        return Err(MetricError::NonFinite { index });
    }
    if returns.len() < 2 {
        return Err(MetricError::TooFewObservations {
            needed: 2,
            got: returns.len(),
        });
    }
    let scale = if let Some(p) = annualization_periods {
        if !(p.is_finite() && p > 0.0) {
            return Err(MetricError::InvalidAnnualization(p));
        }
        p.sqrt()
    } else {
        1.0
    };

    let mean = mean_f64(returns);
    let std = std_dev(returns);
    let magnitude = returns.iter().fold(0.0_f64, |m, r| m.max(r.abs()));
    if std <= magnitude * ZERO_VARIANCE_TOLERANCE {
        return Err(MetricError::ZeroVariance);
    }
    Ok(mean / std * scale)
}

/// Maximum drawdown as a positive fraction (0.5 = 50% below the running peak).
///
/// Returns 0.0 for empty or non-decreasing series. Points where the running
/// peak is not positive are skipped.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            let dd = (peak - v) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Drawdown at every point, same length as the input.
pub fn drawdown_curve(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&v| {
            peak = peak.max(v);
            if peak > 0.0 {
                (peak - v) / peak
            } else {
                0.0
            }
        })
        .collect()
}

/// Last cumulative PNL over initial capital.
pub fn cumulative_return(cumulative_pnl: &[f64], initial_capital: f64) -> f64 {
    match cumulative_pnl.last() {
        Some(&last) if initial_capital > 0.0 && last.is_finite() => last / initial_capital,
        _ => 0.0,
    }
}

/// Per-period returns: change in cumulative PNL over that day's total value.
///
/// The first row has no prior day and yields nothing; days with a zero or
/// non-finite total value are skipped.
pub fn period_returns(series: &PnlSeries) -> Vec<f64> {
    series
        .rows()
        .windows(2)
        .filter_map(|w| {
            let (prev, cur) = (&w[0], &w[1]);
            if cur.total_value == 0.0 || !cur.total_value.is_finite() {
                return None;
            }
            let r = (cur.cumulative_pnl - prev.cumulative_pnl) / cur.total_value;
            r.is_finite().then_some(r)
        })
        .collect()
}

// ─── Helpers ────────────────────────────────────────────────────────

pub fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
