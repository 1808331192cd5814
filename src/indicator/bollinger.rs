use crate::indicator::Metric;
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPosition {
    /// Close at or above the upper band.
    AtUpper,
    /// Close at or below the lower band.
    AtLower,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandWidthState {
    Squeeze,
    Normal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandsResult {
    pub upper: Metric,
    pub middle: Metric,
    pub lower: Metric,
    /// `(upper - lower) / middle * 100`
    pub bandwidth_pct: Metric,
    pub position: Option<BandPosition>,
    pub width_state: Option<BandWidthState>,
}

pub fn compute(
    closes: &[f64],
    period: usize,
    std_dev_multiplier: f64,
    squeeze_threshold_pct: f64,
) -> BandsResult {
    let n = closes.len();
    let middle = stats::last_defined(&stats::rolling_mean(closes, period));
    let std_dev = stats::last_defined(&stats::rolling_std(closes, period));

    let bands = middle.zip(std_dev).map(|(m, s)| {
        let upper = m + std_dev_multiplier * s;
        let lower = m - std_dev_multiplier * s;
        (upper, m, lower)
    });

    let bandwidth = bands
        .filter(|(_, m, _)| *m != 0.0)
        .map(|(upper, m, lower)| (upper - lower) / m * 100.0);

    let position = match (bands, closes.last()) {
        (Some((upper, _, lower)), Some(&close)) => Some(if close >= upper {
            BandPosition::AtUpper
        } else if close <= lower {
            BandPosition::AtLower
        } else {
            BandPosition::Neutral
        }),
        _ => None,
    };

    let width_state = bandwidth.map(|w| {
        if w < squeeze_threshold_pct {
            BandWidthState::Squeeze
        } else {
            BandWidthState::Normal
        }
    });

    BandsResult {
        upper: Metric::from_option(bands.map(|b| b.0), period, n),
        middle: Metric::from_option(middle, period, n),
        lower: Metric::from_option(bands.map(|b| b.2), period, n),
        bandwidth_pct: Metric::from_option(bandwidth, period, n),
        position,
        width_state,
    }
}
