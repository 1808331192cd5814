use crate::indicator::Metric;

/// Look-back span of a return reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    Bars(usize),
    /// From the first bar of the series to the last.
    FullSeries,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HorizonReturn {
    pub horizon: Horizon,
    pub change_pct: Metric,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceResult {
    /// Configured horizons in order, followed by the full-series return.
    pub returns: Vec<HorizonReturn>,
}

impl PerformanceResult {
    pub fn get(&self, horizon: Horizon) -> Option<Metric> {
        self.returns
            .iter()
            .find(|r| r.horizon == horizon)
            .map(|r| r.change_pct)
    }
}

pub fn compute(closes: &[f64], horizons: &[usize]) -> PerformanceResult {
    let mut returns: Vec<HorizonReturn> = horizons
        .iter()
        .map(|&h| HorizonReturn {
            horizon: Horizon::Bars(h),
            change_pct: change_over(closes, h),
        })
        .collect();
    returns.push(HorizonReturn {
        horizon: Horizon::FullSeries,
        change_pct: change_over(closes, closes.len().max(1)),
    });
    PerformanceResult { returns }
}

/// Percent change from the close `bars` positions back (counting the last bar) to the last close.
pub fn change_over(closes: &[f64], bars: usize) -> Metric {
    let n = closes.len();
    if bars == 0 || n < bars {
        return Metric::Insufficient {
            required: bars,
            available: n,
        };
    }
    let base = closes[n - bars];
    let last = closes[n - 1];
    Metric::from_option(Some((last - base) / base * 100.0), bars, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_shorter_than_series_is_insufficient() {
        let result = compute(&[100.0; 10], &[7, 30]);
        assert_eq!(result.get(Horizon::Bars(7)), Some(Metric::Value(0.0)));
        assert_eq!(
            result.get(Horizon::Bars(30)),
            Some(Metric::Insufficient {
                required: 30,
                available: 10
            })
        );
    }

    #[test]
    fn change_is_measured_from_horizon_start() {
        let closes = [50.0, 100.0, 105.0, 110.0];
        assert!((change_over(&closes, 3).value().unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn full_series_return() {
        let result = compute(&[100.0, 150.0, 200.0], &[7]);
        assert_eq!(result.get(Horizon::FullSeries), Some(Metric::Value(100.0)));
        assert_eq!(result.returns.len(), 2);
    }

    #[test]
    fn empty_series_has_no_returns() {
        let result = compute(&[], &[7]);
        assert!(result.returns.iter().all(|r| !r.change_pct.is_defined()));
    }
}
