use crate::indicator::Metric;
use crate::stats;

const OVERBOUGHT: f64 = 70.0;
const OVERSOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumResult {
    pub period: usize,
    pub rsi: Metric,
    pub signal: Option<RsiSignal>,
}

/// RSI from simple rolling means of gains and losses.
///
/// Aligned with `closes`: index `i` is defined once `period` price changes
/// are available (`i >= period`).
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if closes.len() < 2 || period == 0 {
        return vec![None; closes.len()];
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let gains: Vec<f64> = deltas.iter().map(|&d| d.max(0.0)).collect();
    let losses: Vec<f64> = deltas.iter().map(|&d| (-d).max(0.0)).collect();

    let avg_gain = stats::rolling_mean(&gains, period);
    let avg_loss = stats::rolling_mean(&losses, period);

    let mut out = Vec::with_capacity(closes.len());
    out.push(None);
    out.extend(
        avg_gain
            .into_iter()
            .zip(avg_loss)
            .map(|(g, l)| Some(rsi_value(g?, l?))),
    );
    out
}

pub fn compute(closes: &[f64], period: usize) -> MomentumResult {
    let latest = stats::last_defined(&rsi_series(closes, period));
    let rsi = Metric::from_option(latest, period + 1, closes.len());
    MomentumResult {
        period,
        rsi,
        signal: rsi.value().map(classify),
    }
}

fn classify(rsi: f64) -> RsiSignal {
    if rsi > OVERBOUGHT {
        RsiSignal::Overbought
    } else if rsi < OVERSOLD {
        RsiSignal::Oversold
    } else {
        RsiSignal::Neutral
    }
}

/// No losses reads as 100; no movement at all reads as 50.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rsi_insufficient_data() {
        let result = compute(&[1.0; 14], 14);
        assert_eq!(
            result.rsi,
            Metric::Insufficient {
                required: 15,
                available: 14
            }
        );
        assert_eq!(result.signal, None);
    }

    #[test]
    fn rsi_series_alignment() {
        let values = rsi_series(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(values.len(), 4);
        assert!(values[..3].iter().all(Option::is_none));
        assert_eq!(values[3], Some(100.0));
    }

    #[test]
    fn rsi_all_gains_returns_100() {
        let result = compute(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(result.rsi, Metric::Value(100.0));
        assert_eq!(result.signal, Some(RsiSignal::Overbought));
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let result = compute(&[4.0, 3.0, 2.0, 1.0], 3);
        assert_eq!(result.rsi, Metric::Value(0.0));
        assert_eq!(result.signal, Some(RsiSignal::Oversold));
    }

    #[test]
    fn rsi_flat_prices_returns_50() {
        let result = compute(&[10.0; 20], 14);
        assert_eq!(result.rsi, Metric::Value(50.0));
        assert_eq!(result.signal, Some(RsiSignal::Neutral));
    }

    #[test]
    fn rsi_known_value() {
        // changes: +2, -1, +2 -> avg gain 4/3, avg loss 1/3, RS = 4
        let result = compute(&[10.0, 12.0, 11.0, 13.0], 3);
        assert!((result.rsi.value().unwrap() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_uses_trailing_window_only() {
        // An early crash falls outside the 3-change window.
        let result = compute(&[100.0, 10.0, 11.0, 12.0, 13.0], 3);
        assert_eq!(result.rsi, Metric::Value(100.0));
    }

    proptest! {
        #[test]
        fn rsi_is_bounded(closes in prop::collection::vec(1f64..1e4, 15..120)) {
            for value in rsi_series(&closes, 14).into_iter().flatten() {
                prop_assert!((0.0..=100.0).contains(&value));
            }
        }
    }
}
