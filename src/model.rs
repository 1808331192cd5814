use std::fmt;

use chrono::NaiveDate;
use error_stack::{Report, bail};
use serde::Deserialize;

use crate::error::SeriesError;

/// Asset class of an instrument universe.
///
/// String representations match the config file format (e.g. `"crypto"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Equity,
    Crypto,
    Commodity,
}

impl AssetClass {
    /// Parse a config-format string into an `AssetClass`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "equity" => Some(Self::Equity),
            "crypto" => Some(Self::Crypto),
            "commodity" => Some(Self::Commodity),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equity => "equity",
            Self::Crypto => "crypto",
            Self::Commodity => "commodity",
        }
    }

    /// Bars per year: crypto trades every calendar day, the rest on sessions.
    pub fn annualization(self) -> f64 {
        match self {
            Self::Crypto => 365.0,
            Self::Equity | Self::Commodity => 252.0,
        }
    }

    pub fn default_cross_pair(self) -> CrossPair {
        match self {
            Self::Equity | Self::Crypto => CrossPair::Long,
            Self::Commodity => CrossPair::Short,
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which pair of moving averages the golden/death cross is tested on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossPair {
    /// MA20 against MA50.
    Short,
    /// MA50 against MA200.
    Long,
}

impl CrossPair {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "short" => Some(Self::Short),
            "long" => Some(Self::Long),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Short => "MA20/MA50",
            Self::Long => "MA50/MA200",
        }
    }
}

/// One daily OHLCV observation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p > 0.0)
            && self.volume.is_finite()
            && self.volume >= 0.0
            && self.low <= self.open.min(self.close)
            && self.open.max(self.close) <= self.high
    }
}

/// Time-ascending bars for a single instrument.
///
/// The engine only ever borrows a series; it is never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting unordered or duplicate dates and malformed bars.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, Report<SeriesError>> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.is_valid() {
                bail!(SeriesError::InvalidBar { index });
            }
            if index > 0 && bars[index - 1].timestamp >= bar.timestamp {
                bail!(SeriesError::OutOfOrder { index });
            }
        }
        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Keep only the most recent `n` bars.
    pub fn tail(mut self, n: usize) -> Self {
        let skip = self.bars.len().saturating_sub(n);
        self.bars.drain(..skip);
        self
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.timestamp)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
    }

    /// Series with flat bars (open = high = low = close) and the given volumes.
    pub fn series_from(closes: &[f64], volumes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&c, &v))| PriceBar {
                timestamp: day(i),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: v,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
        series_from(closes, &vec![1000.0; closes.len()])
    }

    /// Closes rising linearly from `start` to `end` over `n` bars.
    pub fn linear(start: f64, end: f64, n: usize) -> Vec<f64> {
        let step = (end - start) / (n as f64 - 1.0);
        (0..n).map(|i| start + step * i as f64).collect()
    }
}
