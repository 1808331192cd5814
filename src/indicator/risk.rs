use crate::indicator::Metric;
use crate::stats;

#[derive(Debug, Clone, PartialEq)]
pub struct RiskResult {
    /// Sample std of daily log returns, annualized, in percent.
    pub volatility_annual_pct: Metric,
    /// Deepest decline from a running peak, in percent (always <= 0).
    pub max_drawdown_pct: Metric,
    /// Decline from the running peak at the last bar, in percent.
    pub current_drawdown_pct: Metric,
}

pub fn compute(closes: &[f64], annualization: f64) -> RiskResult {
    let n = closes.len();
    let drawdowns = drawdown_series(closes);

    RiskResult {
        volatility_annual_pct: Metric::from_option(
            annualized_volatility(closes, annualization),
            3,
            n,
        ),
        max_drawdown_pct: Metric::from_option(
            drawdowns.iter().copied().reduce(f64::min),
            1,
            n,
        ),
        current_drawdown_pct: Metric::from_option(drawdowns.last().copied(), 1, n),
    }
}

pub fn annualized_volatility(closes: &[f64], annualization: f64) -> Option<f64> {
    let log_returns: Vec<f64> = closes.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    stats::sample_std(&log_returns).map(|s| s * annualization.sqrt() * 100.0)
}

/// Percent distance below the running maximum at every bar.
pub fn drawdown_series(closes: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    closes
        .iter()
        .map(|&close| {
            peak = peak.max(close);
            (close - peak) / peak * 100.0
        })
        .collect()
}
