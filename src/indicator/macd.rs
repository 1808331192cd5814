use crate::indicator::Metric;
use crate::stats::{self, Cross};

/// Sign of the latest histogram value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdState {
    Bullish,
    Bearish,
}

/// Histogram crossing the zero line between the last two bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdCrossover {
    BullishCrossover,
    BearishCrossover,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacdResult {
    pub macd: Metric,
    pub signal_line: Metric,
    pub histogram: Metric,
    pub state: Option<MacdState>,
    pub crossover: MacdCrossover,
}

/// Calculate (macd_line, signal_line, histogram) for every bar.
pub fn macd_lines(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let fast_ema = stats::ewm_mean(closes, fast);
    let slow_ema = stats::ewm_mean(closes, slow);
    let macd_line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = stats::ewm_mean(&macd_line, signal);
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();
    (macd_line, signal_line, histogram)
}

/// Readings are only reported once `slow` bars have warmed the averages up.
pub fn compute(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdResult {
    let n = closes.len();
    let (macd_line, signal_line, histogram) = macd_lines(closes, fast, slow, signal);
    let warm = n >= slow;

    let latest = |values: &[f64]| -> Metric {
        Metric::from_option(values.last().copied().filter(|_| warm), slow, n)
    };

    let hist = latest(&histogram);
    let state = hist.value().map(|h| {
        if h > 0.0 {
            MacdState::Bullish
        } else {
            MacdState::Bearish
        }
    });

    let crossover = if warm {
        let hist: Vec<Option<f64>> = histogram.iter().copied().map(Some).collect();
        let zero = vec![Some(0.0); hist.len()];
        match stats::crossover(&hist, &zero) {
            Cross::Above => MacdCrossover::BullishCrossover,
            Cross::Below => MacdCrossover::BearishCrossover,
            Cross::None => MacdCrossover::Neutral,
        }
    } else {
        MacdCrossover::Neutral
    };

    MacdResult {
        macd: latest(&macd_line),
        signal_line: latest(&signal_line),
        histogram: hist,
        state,
        crossover,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::linear;

    #[test]
    fn macd_insufficient_data() {
        let result = compute(&[1.0; 20], 12, 26, 9);
        assert_eq!(
            result.macd,
            Metric::Insufficient {
                required: 26,
                available: 20
            }
        );
        assert_eq!(result.state, None);
        assert_eq!(result.crossover, MacdCrossover::Neutral);
    }

    #[test]
    fn macd_flat_prices_returns_zero() {
        let result = compute(&[10.0; 40], 12, 26, 9);
        assert_eq!(result.macd, Metric::Value(0.0));
        assert_eq!(result.histogram, Metric::Value(0.0));
        assert_eq!(result.state, Some(MacdState::Bearish));
        assert_eq!(result.crossover, MacdCrossover::Neutral);
    }

    #[test]
    fn macd_lines_keep_length() {
        let (m, s, h) = macd_lines(&linear(1.0, 2.0, 30), 12, 26, 9);
        assert_eq!((m.len(), s.len(), h.len()), (30, 30, 30));
    }

    #[test]
    fn rising_prices_are_bullish() {
        let result = compute(&linear(100.0, 200.0, 60), 12, 26, 9);
        assert!(result.macd.value().unwrap() > 0.0);
        assert_eq!(result.state, Some(MacdState::Bullish));
    }

    #[test]
    fn histogram_flip_is_a_crossover_event() {
        // Flat history, then a jump: histogram goes from 0 to positive.
        let mut closes = vec![100.0; 40];
        closes.push(120.0);
        let result = compute(&closes, 12, 26, 9);
        assert_eq!(result.crossover, MacdCrossover::BullishCrossover);

        let mut closes = vec![100.0; 40];
        closes.push(80.0);
        let result = compute(&closes, 12, 26, 9);
        assert_eq!(result.crossover, MacdCrossover::BearishCrossover);
        assert_eq!(result.state, Some(MacdState::Bearish));
    }

    #[test]
    fn state_and_crossover_are_independent() {
        // Long rise: histogram has been positive for a while, no fresh event.
        let result = compute(&linear(100.0, 200.0, 120), 12, 26, 9);
        assert_eq!(result.crossover, MacdCrossover::Neutral);
    }
}
