//! Flattening of an [`IndicatorSet`] into the key/value report handed to
//! the strategist and dispatcher.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::indicator::IndicatorSet;
use crate::indicator::Metric;
use crate::indicator::bollinger::{BandPosition, BandWidthState};
use crate::indicator::macd::{MacdCrossover, MacdState};
use crate::indicator::performance::Horizon;
use crate::indicator::rsi::RsiSignal;
use crate::indicator::trend::{CrossSignal, TrendStatus};
use crate::indicator::volume::VolumeSpike;

const MISSING: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    Number(f64),
    Text(String),
    Missing,
}

impl Serialize for ReportValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(t) => serializer.serialize_str(t),
            Self::Missing => serializer.serialize_str(MISSING),
        }
    }
}

impl ReportValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Missing => Some(MISSING),
            Self::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Flattened indicator snapshot for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub symbol: String,
    pub fields: BTreeMap<String, ReportValue>,
}

impl Report {
    pub fn get(&self, key: &str) -> Option<&ReportValue> {
        self.fields.get(key)
    }

    /// Deterministic JSON encoding.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Build the report for `symbol` from its computed indicators.
pub fn summarize(symbol: &str, set: &IndicatorSet) -> Report {
    let mut fields = BTreeMap::new();
    let mut put = |key: &str, value: ReportValue| {
        fields.insert(key.to_string(), value);
    };

    put("symbol", text(symbol));
    put("price", ReportValue::Number(round2(set.price)));
    put("bars", ReportValue::Number(set.bars as f64));

    // Trend
    put(
        "trend_status",
        set.trend.status.map_or(ReportValue::Missing, |s| text(trend_label(s))),
    );
    put("ma_cross", text(cross_label(set.trend.cross)));
    put("ma_cross_pair", text(set.trend.cross_pair.label()));
    put("ma20", number(set.trend.ma20));
    put("ma50", number(set.trend.ma50));
    put("ma200", number(set.trend.ma200));

    // Momentum
    put("rsi", number(set.momentum.rsi));
    put(
        "rsi_signal",
        set.momentum.signal.map_or(ReportValue::Missing, |s| text(rsi_label(s))),
    );
    put("macd", number(set.macd.macd));
    put("macd_signal_line", number(set.macd.signal_line));
    put("macd_histogram", number(set.macd.histogram));
    put(
        "macd_signal",
        set.macd.state.map_or(ReportValue::Missing, |s| text(macd_state_label(s))),
    );
    put("macd_crossover", text(macd_cross_label(set.macd.crossover)));

    // Volatility
    put("bb_upper", number(set.bands.upper));
    put("bb_middle", number(set.bands.middle));
    put("bb_lower", number(set.bands.lower));
    put("bb_width", percent(set.bands.bandwidth_pct));
    put(
        "bb_state",
        set.bands.width_state.map_or(ReportValue::Missing, |s| text(width_label(s))),
    );
    put(
        "bb_position",
        set.bands.position.map_or(ReportValue::Missing, |p| text(position_label(p))),
    );
    put("volume_ratio", number(set.volume.ratio));
    put(
        "volume_spike",
        set.volume.spike.map_or(ReportValue::Missing, |s| text(spike_label(s))),
    );

    // Levels
    put("support", number(set.short_levels.support));
    put("resistance", number(set.short_levels.resistance));
    put("levels_window", ReportValue::Number(set.short_levels.window as f64));
    put("low_52w", number(set.long_levels.support));
    put("high_52w", number(set.long_levels.resistance));
    put("range_window", ReportValue::Number(set.long_levels.window as f64));

    // Risk
    put("max_drawdown", percent(set.risk.max_drawdown_pct));
    put("current_drawdown", percent(set.risk.current_drawdown_pct));
    put("volatility_annual", percent_1(set.risk.volatility_annual_pct));

    // Performance
    for r in &set.performance.returns {
        let key = match r.horizon {
            Horizon::Bars(n) => format!("perf_{n}d"),
            Horizon::FullSeries => "perf_full".to_string(),
        };
        put(key.as_str(), signed_percent(r.change_pct));
    }

    Report {
        symbol: symbol.to_string(),
        fields,
    }
}

fn text(s: &str) -> ReportValue {
    ReportValue::Text(s.to_string())
}

fn round2(v: f64) -> f64 {
    let r = (v * 100.0).round() / 100.0;
    // Avoid "-0" in the output.
    if r == 0.0 { 0.0 } else { r }
}

fn number(m: Metric) -> ReportValue {
    m.value()
        .map_or(ReportValue::Missing, |v| ReportValue::Number(round2(v)))
}

fn percent(m: Metric) -> ReportValue {
    m.value()
        .map_or(ReportValue::Missing, |v| ReportValue::Text(format!("{:.2}%", round2(v))))
}

fn percent_1(m: Metric) -> ReportValue {
    m.value().map_or(ReportValue::Missing, |v| {
        let r = (v * 10.0).round() / 10.0;
        ReportValue::Text(format!("{:.1}%", if r == 0.0 { 0.0 } else { r }))
    })
}

fn signed_percent(m: Metric) -> ReportValue {
    m.value()
        .map_or(ReportValue::Missing, |v| ReportValue::Text(format!("{:+.2}%", round2(v))))
}

fn trend_label(status: TrendStatus) -> &'static str {
    match status {
        TrendStatus::StrongBullish => "Bullish (Strong)",
        TrendStatus::StrongBearish => "Bearish (Strong)",
        TrendStatus::BullishCorrection => "Bullish (Correction)",
        TrendStatus::Sideways => "Sideways / Choppy",
    }
}

fn cross_label(cross: CrossSignal) -> &'static str {
    match cross {
        CrossSignal::GoldenCross => "GOLDEN CROSS (Bullish)",
        CrossSignal::DeathCross => "DEATH CROSS (Bearish)",
        CrossSignal::Neutral => "Neutral",
    }
}

fn rsi_label(signal: RsiSignal) -> &'static str {
    match signal {
        RsiSignal::Overbought => "Overbought (>70)",
        RsiSignal::Oversold => "Oversold (<30)",
        RsiSignal::Neutral => "Neutral",
    }
}

fn macd_state_label(state: MacdState) -> &'static str {
    match state {
        MacdState::Bullish => "Bullish",
        MacdState::Bearish => "Bearish",
    }
}

fn macd_cross_label(cross: MacdCrossover) -> &'static str {
    match cross {
        MacdCrossover::BullishCrossover => "Bullish Crossover",
        MacdCrossover::BearishCrossover => "Bearish Crossover",
        MacdCrossover::Neutral => "Neutral",
    }
}

fn width_label(state: BandWidthState) -> &'static str {
    match state {
        BandWidthState::Squeeze => "Squeeze",
        BandWidthState::Normal => "Normal",
    }
}

fn position_label(position: BandPosition) -> &'static str {
    match position {
        BandPosition::AtUpper => "Upper Band (Potential Rejection)",
        BandPosition::AtLower => "Lower Band (Potential Bounce)",
        BandPosition::Neutral => "Neutral",
    }
}

fn spike_label(spike: VolumeSpike) -> &'static str {
    match spike {
        VolumeSpike::Extreme => "Extreme",
        VolumeSpike::High => "High",
        VolumeSpike::Normal => "Normal",
    }
}
