use crate::indicator::Metric;
use crate::model::CrossPair;
use crate::stats::{self, Cross};

const FAST: usize = 20;
const MID: usize = 50;
const SLOW: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendStatus {
    /// close > MA50 > MA200
    StrongBullish,
    /// close < MA50 < MA200
    StrongBearish,
    /// Not strongly aligned, but close is above MA200.
    BullishCorrection,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossSignal {
    GoldenCross,
    DeathCross,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendResult {
    pub ma20: Metric,
    pub ma50: Metric,
    pub ma200: Metric,
    /// `None` until both MA50 and MA200 are defined.
    pub status: Option<TrendStatus>,
    pub cross_pair: CrossPair,
    pub cross: CrossSignal,
}

pub fn compute(closes: &[f64], cross_pair: CrossPair) -> TrendResult {
    let n = closes.len();
    let ma20 = stats::rolling_mean(closes, FAST);
    let ma50 = stats::rolling_mean(closes, MID);
    let ma200 = stats::rolling_mean(closes, SLOW);

    let status = match (
        closes.last(),
        stats::last_defined(&ma50),
        stats::last_defined(&ma200),
    ) {
        (Some(&close), Some(mid), Some(slow)) => Some(classify(close, mid, slow)),
        _ => None,
    };

    let cross = match cross_pair {
        CrossPair::Short => cross_signal(&ma20, &ma50),
        CrossPair::Long => cross_signal(&ma50, &ma200),
    };

    TrendResult {
        ma20: Metric::from_option(stats::last_defined(&ma20), FAST, n),
        ma50: Metric::from_option(stats::last_defined(&ma50), MID, n),
        ma200: Metric::from_option(stats::last_defined(&ma200), SLOW, n),
        status,
        cross_pair,
        cross,
    }
}

/// Latest MA50 without building the full trend result.
pub fn latest_mid_average(closes: &[f64]) -> Option<f64> {
    stats::last_defined(&stats::rolling_mean(closes, MID))
}

fn classify(close: f64, mid: f64, slow: f64) -> TrendStatus {
    if close > mid && mid > slow {
        TrendStatus::StrongBullish
    } else if close < mid && mid < slow {
        TrendStatus::StrongBearish
    } else if close > slow {
        TrendStatus::BullishCorrection
    } else {
        TrendStatus::Sideways
    }
}

fn cross_signal(fast: &[Option<f64>], slow: &[Option<f64>]) -> CrossSignal {
    match stats::crossover(fast, slow) {
        Cross::Above => CrossSignal::GoldenCross,
        Cross::Below => CrossSignal::DeathCross,
        Cross::None => CrossSignal::Neutral,
    }
}
