use crate::indicator::Metric;
use crate::stats;

/// Support and resistance over a trailing window of bars.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelsResult {
    pub window: usize,
    /// Lowest low in the window.
    pub support: Metric,
    /// Highest high in the window.
    pub resistance: Metric,
}

pub fn compute(highs: &[f64], lows: &[f64], window: usize) -> LevelsResult {
    let n = highs.len().min(lows.len());
    LevelsResult {
        window,
        support: Metric::from_option(
            stats::last_defined(&stats::rolling_min(lows, window)),
            window,
            n,
        ),
        resistance: Metric::from_option(
            stats::last_defined(&stats::rolling_max(highs, window)),
            window,
            n,
        ),
    }
}
