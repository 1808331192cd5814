pub mod bollinger;
pub mod levels;
pub mod macd;
pub mod performance;
pub mod risk;
pub mod rsi;
pub mod trend;
pub mod volume;


use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::model::{AssetClass, CrossPair, PriceSeries};

use bollinger::BandsResult;
use levels::LevelsResult;
use macd::MacdResult;
use performance::PerformanceResult;
use risk::RiskResult;
use rsi::MomentumResult;
use trend::TrendResult;
use volume::VolumeResult;

/// A numeric indicator reading that may be unavailable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    Value(f64),
    /// The series is shorter than the indicator's window.
    Insufficient { required: usize, available: usize },
    /// The formula has no defined value for this input (e.g. a zero divisor).
    Degenerate,
}

impl Metric {
    /// Tag `value` as insufficient when fewer than `required` points were available.
    pub fn from_option(value: Option<f64>, required: usize, available: usize) -> Self {
        match value {
            Some(v) if v.is_finite() && available >= required => Self::Value(v),
            Some(_) if available >= required => Self::Degenerate,
            _ => Self::Insufficient {
                required,
                available,
            },
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Self::Value(_))
    }
}

/// Parameters that distinguish one asset class's analysis from another's.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineProfile {
    /// Bars per year for annualized volatility.
    pub annualization: f64,
    pub cross_pair: CrossPair,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    /// Bandwidth (percent of the middle band) under which bands are a squeeze.
    pub squeeze_threshold_pct: f64,
    pub levels_short_window: usize,
    pub levels_long_window: usize,
    pub return_horizons: Vec<usize>,
    pub volume_window: usize,
    pub volume_high_ratio: f64,
    pub volume_extreme_ratio: f64,
}

impl EngineProfile {
    pub fn for_asset_class(class: AssetClass) -> Self {
        Self {
            annualization: class.annualization(),
            cross_pair: class.default_cross_pair(),
            ..Self::default()
        }
    }

    /// Reject parameters no indicator can be computed with.
    pub fn validate(&self) -> Result<(), Report<IndicatorError>> {
        let windows = [
            self.rsi_period,
            self.macd_fast,
            self.macd_slow,
            self.macd_signal,
            self.bollinger_period,
            self.levels_short_window,
            self.levels_long_window,
            self.volume_window,
        ];
        if windows.contains(&0) || self.return_horizons.contains(&0) {
            bail!(IndicatorError::InvalidParameter {
                name: "all periods and windows must be > 0".into(),
            });
        }
        if self.macd_fast >= self.macd_slow {
            bail!(IndicatorError::InvalidParameter {
                name: "macd_fast must be < macd_slow".into(),
            });
        }
        let positive = |x: f64| x.is_finite() && x > 0.0;
        if !positive(self.annualization) {
            bail!(IndicatorError::InvalidParameter {
                name: "annualization must be > 0".into(),
            });
        }
        if !positive(self.bollinger_multiplier) || !positive(self.squeeze_threshold_pct) {
            bail!(IndicatorError::InvalidParameter {
                name: "bollinger multiplier and squeeze threshold must be > 0".into(),
            });
        }
        if !positive(self.volume_high_ratio) || self.volume_high_ratio > self.volume_extreme_ratio {
            bail!(IndicatorError::InvalidParameter {
                name: "volume ratios must satisfy 0 < high <= extreme".into(),
            });
        }
        Ok(())
    }
}

impl Default for EngineProfile {
    fn default() -> Self {
        Self {
            annualization: 252.0,
            cross_pair: CrossPair::Long,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
            squeeze_threshold_pct: 5.0,
            levels_short_window: 20,
            levels_long_window: 252,
            return_horizons: vec![7, 30],
            volume_window: 20,
            volume_high_ratio: 1.5,
            volume_extreme_ratio: 2.0,
        }
    }
}

/// Every indicator family computed for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub price: f64,
    pub bars: usize,
    pub trend: TrendResult,
    pub momentum: MomentumResult,
    pub macd: MacdResult,
    pub bands: BandsResult,
    pub short_levels: LevelsResult,
    pub long_levels: LevelsResult,
    pub risk: RiskResult,
    pub performance: PerformanceResult,
    pub volume: VolumeResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    /// The series had no bars; nothing was computed.
    NoData,
    Computed(Box<IndicatorSet>),
}

impl Analysis {
    pub fn computed(&self) -> Option<&IndicatorSet> {
        match self {
            Self::Computed(set) => Some(set),
            Self::NoData => None,
        }
    }
}

impl IndicatorSet {
    /// Run every indicator family over `series`.
    ///
    /// Never fails: short series degrade individual readings to
    /// [`Metric::Insufficient`], an empty series yields [`Analysis::NoData`].
    pub fn compute(series: &PriceSeries, profile: &EngineProfile) -> Analysis {
        let Some(price) = series.last_close() else {
            return Analysis::NoData;
        };

        let closes = series.closes();
        let highs = series.highs();
        let lows = series.lows();
        let volumes = series.volumes();

        let set = IndicatorSet {
            price,
            bars: series.len(),
            trend: trend::compute(&closes, profile.cross_pair),
            momentum: rsi::compute(&closes, profile.rsi_period),
            macd: macd::compute(
                &closes,
                profile.macd_fast,
                profile.macd_slow,
                profile.macd_signal,
            ),
            bands: bollinger::compute(
                &closes,
                profile.bollinger_period,
                profile.bollinger_multiplier,
                profile.squeeze_threshold_pct,
            ),
            short_levels: levels::compute(&highs, &lows, profile.levels_short_window),
            long_levels: levels::compute(&highs, &lows, profile.levels_long_window),
            risk: risk::compute(&closes, profile.annualization),
            performance: performance::compute(&closes, &profile.return_horizons),
            volume: volume::compute(
                &volumes,
                profile.volume_window,
                profile.volume_high_ratio,
                profile.volume_extreme_ratio,
            ),
        };

        Analysis::Computed(Box::new(set))
    }
}
