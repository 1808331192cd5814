use std::collections::HashMap;

use serde::Serialize;

use crate::indicator::{rsi, trend, volume};
use crate::model::PriceSeries;

pub const DEFAULT_MIN_BARS: usize = 50;

const RSI_PERIOD: usize = 14;
const VOLUME_WINDOW: usize = 20;
const VOLUME_WEIGHT: f64 = 2.0;
const TREND_WEIGHT: f64 = 5.0;
const RSI_SWEET_SPOT_BONUS: f64 = 2.0;

/// Cheap inputs to the opportunity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factors {
    /// Last volume over the prior 20-bar average; 0 when unavailable.
    pub volume_ratio: f64,
    /// Whether the last close is above MA50.
    pub above_trend: bool,
    /// `None` when unavailable or when the RSI window has no price movement.
    pub rsi: Option<f64>,
}

impl Factors {
    pub fn from_series(series: &PriceSeries) -> Self {
        let closes = series.closes();
        let volume = volume::compute(&series.volumes(), VOLUME_WINDOW, 1.5, 2.0);
        let above_trend = match (series.last_close(), trend::latest_mid_average(&closes)) {
            (Some(close), Some(ma50)) => close > ma50,
            _ => false,
        };
        Self {
            volume_ratio: volume.ratio.value().unwrap_or(0.0),
            above_trend,
            rsi: directional_rsi(&closes),
        }
    }

    /// `2·ratio + 5·trend + (2 if 30 < RSI < 70)`
    pub fn score(&self) -> f64 {
        let trend = if self.above_trend { 1.0 } else { 0.0 };
        let bonus = match self.rsi {
            Some(r) if r > 30.0 && r < 70.0 => RSI_SWEET_SPOT_BONUS,
            _ => 0.0,
        };
        VOLUME_WEIGHT * self.volume_ratio + TREND_WEIGHT * trend + bonus
    }
}

/// A flat window reads as RSI 50 but says nothing about momentum.
fn directional_rsi(closes: &[f64]) -> Option<f64> {
    let window = &closes[closes.len().saturating_sub(RSI_PERIOD + 1)..];
    if window.windows(2).all(|w| w[0] == w[1]) {
        return None;
    }
    rsi::compute(closes, RSI_PERIOD).rsi.value()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub symbol: String,
    pub series: PriceSeries,
    pub factors: Factors,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Origin {
    /// Always analyzed regardless of score.
    Core,
    Ranked { score: f64 },
    /// The asset class analyzes its whole universe without ranking.
    Listed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub symbol: String,
    pub series: PriceSeries,
    pub origin: Origin,
}

/// Scores a scanned universe and picks the instruments worth a full analysis.
#[derive(Debug, Clone)]
pub struct CandidateRanker {
    core: Vec<String>,
    min_bars: usize,
}

impl CandidateRanker {
    pub fn new(core: Vec<String>, min_bars: usize) -> Self {
        Self { core, min_bars }
    }

    /// Score every instrument with at least `min_bars` bars, best first.
    ///
    /// The sort is stable, so equal scores keep their scan order.
    pub fn rank(&self, universe: Vec<(String, PriceSeries)>) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = universe
            .into_iter()
            .filter_map(|(symbol, series)| {
                if series.len() < self.min_bars {
                    tracing::debug!(
                        symbol = %symbol,
                        available = series.len(),
                        required = self.min_bars,
                        "insufficient bars for ranking"
                    );
                    return None;
                }
                let factors = Factors::from_series(&series);
                Some(Candidate {
                    score: factors.score(),
                    symbol,
                    series,
                    factors,
                })
            })
            .collect();

        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates
    }

    /// Core instruments first, then the best-ranked rest, at most `limit` in total.
    ///
    /// Core instruments are included whenever they are in `universe` with at
    /// least one bar, even below the ranking threshold.
    pub fn select(&self, universe: Vec<(String, PriceSeries)>, limit: usize) -> Vec<Selection> {
        let (core_entries, rest): (Vec<_>, Vec<_>) = universe
            .into_iter()
            .partition(|(symbol, _)| self.core.contains(symbol));

        let mut core_entries: HashMap<String, PriceSeries> = core_entries
            .into_iter()
            .filter(|(_, series)| !series.is_empty())
            .rev()
            .collect();

        let mut selected: Vec<Selection> = Vec::with_capacity(limit);
        for symbol in &self.core {
            if selected.len() >= limit {
                break;
            }
            if let Some(series) = core_entries.remove(symbol) {
                selected.push(Selection {
                    symbol: symbol.clone(),
                    series,
                    origin: Origin::Core,
                });
            }
        }

        for candidate in self.rank(rest) {
            if selected.len() >= limit {
                break;
            }
            if selected.iter().any(|s| s.symbol == candidate.symbol) {
                continue;
            }
            selected.push(Selection {
                symbol: candidate.symbol,
                series: candidate.series,
                origin: Origin::Ranked {
                    score: candidate.score,
                },
            });
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{linear, series_from};

    const BARS: usize = 60;

    fn zigzag(start: f64, up: f64, down: f64) -> Vec<f64> {
        let mut closes = vec![start];
        for i in 1..BARS {
            let prev = closes[i - 1];
            closes.push(if i % 2 == 1 { prev + up } else { prev - down });
        }
        closes
    }

    fn volumes(last: f64) -> Vec<f64> {
        let mut v = vec![100.0; BARS - 1];
        v.push(last);
        v
    }

    /// Rising zigzag (RSI ~67), above MA50, 3x volume.
    fn winner() -> PriceSeries {
        series_from(&zigzag(100.0, 2.0, 1.0), &volumes(300.0))
    }

    fn flat() -> PriceSeries {
        series_from(&[100.0; BARS], &volumes(100.0))
    }

    /// Falling zigzag (RSI ~33), below MA50.
    fn sagging() -> PriceSeries {
        series_from(&zigzag(200.0, 1.0, 2.0), &volumes(100.0))
    }

    /// Straight climb: above MA50 but RSI 100.
    fn runaway() -> PriceSeries {
        series_from(&linear(100.0, 200.0, BARS), &volumes(100.0))
    }

    fn universe(entries: &[(&str, PriceSeries)]) -> Vec<(String, PriceSeries)> {
        entries
            .iter()
            .map(|(s, series)| (s.to_string(), series.clone()))
            .collect()
    }

    fn symbols(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.symbol.as_str()).collect()
    }

    #[test]
    fn factor_scores() {
        let factors = Factors::from_series(&winner());
        assert!(factors.above_trend);
        assert!((factors.volume_ratio - 3.0).abs() < 1e-9);
        let rsi = factors.rsi.unwrap();
        assert!(rsi > 30.0 && rsi < 70.0);
        assert!((factors.score() - 13.0).abs() < 1e-9);

        assert!((Factors::from_series(&flat()).score() - 2.0).abs() < 1e-9);
        assert!((Factors::from_series(&runaway()).score() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn flat_window_earns_no_rsi_bonus() {
        let factors = Factors::from_series(&flat());
        assert_eq!(factors.rsi, None);
        assert!(!factors.above_trend);
        assert!((factors.score() - 2.0).abs() < 1e-9);

        // Movement earlier in the series does not count once the window is flat.
        let mut closes = zigzag(100.0, 2.0, 1.0);
        let last = closes[BARS - 1];
        closes.extend([last; 20]);
        let stale = series_from(&closes, &vec![100.0; closes.len()]);
        assert_eq!(Factors::from_series(&stale).rsi, None);
    }

    #[test]
    fn missing_volume_ratio_counts_as_zero() {
        let series = series_from(&[100.0; BARS], &[0.0; BARS]);
        let factors = Factors::from_series(&series);
        assert_eq!(factors.volume_ratio, 0.0);
    }

    #[test]
    fn best_instrument_ranks_first_regardless_of_order() {
        let ranker = CandidateRanker::new(vec![], DEFAULT_MIN_BARS);
        let forward = universe(&[
            ("FLAT", flat()),
            ("SAG", sagging()),
            ("RUN", runaway()),
            ("WIN", winner()),
        ]);
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(ranker.rank(forward)[0].symbol, "WIN");
        assert_eq!(ranker.rank(backward)[0].symbol, "WIN");
    }

    #[test]
    fn ties_keep_scan_order() {
        let ranker = CandidateRanker::new(vec![], DEFAULT_MIN_BARS);
        let drift = series_from(&zigzag(150.0, 1.0, 2.0), &volumes(100.0));
        let ranked = ranker.rank(universe(&[("DRIFT", drift.clone()), ("SAG", sagging())]));
        assert_eq!(ranked[0].score, ranked[1].score);
        assert_eq!(symbols(&ranked), vec!["DRIFT", "SAG"]);
        let ranked = ranker.rank(universe(&[("SAG", sagging()), ("DRIFT", drift)]));
        assert_eq!(symbols(&ranked), vec!["SAG", "DRIFT"]);
    }

    #[test]
    fn ranking_is_deterministic() {
        let ranker = CandidateRanker::new(vec![], DEFAULT_MIN_BARS);
        let input = universe(&[
            ("A", flat()),
            ("B", runaway()),
            ("C", sagging()),
            ("D", flat()),
        ]);
        let first = ranker.rank(input.clone());
        for _ in 0..5 {
            assert_eq!(ranker.rank(input.clone()), first);
        }
    }

    #[test]
    fn short_series_are_skipped_not_fatal() {
        let ranker = CandidateRanker::new(vec![], DEFAULT_MIN_BARS);
        let short = series_from(&[100.0; 10], &[100.0; 10]);
        let ranked = ranker.rank(universe(&[
            ("SHORT", short),
            ("EMPTY", PriceSeries::empty()),
            ("FLAT", flat()),
        ]));
        assert_eq!(symbols(&ranked), vec!["FLAT"]);
    }

    #[test]
    fn core_instruments_come_first() {
        let ranker = CandidateRanker::new(vec!["CORE2".into(), "CORE1".into()], DEFAULT_MIN_BARS);
        let selected = ranker.select(
            universe(&[
                ("WIN", winner()),
                ("CORE1", flat()),
                ("RUN", runaway()),
                ("CORE2", sagging()),
            ]),
            3,
        );
        let names: Vec<&str> = selected.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(names, vec!["CORE2", "CORE1", "WIN"]);
        assert_eq!(selected[0].origin, Origin::Core);
        assert!(matches!(selected[2].origin, Origin::Ranked { score } if (score - 13.0).abs() < 1e-9));
    }

    #[test]
    fn selection_never_exceeds_limit() {
        let ranker = CandidateRanker::new(vec!["A".into(), "B".into()], DEFAULT_MIN_BARS);
        let input = universe(&[("A", flat()), ("B", flat()), ("C", winner()), ("D", runaway())]);
        for limit in 0..6 {
            let selected = ranker.select(input.clone(), limit);
            assert!(selected.len() <= limit);
        }
        assert_eq!(ranker.select(input.clone(), 1)[0].symbol, "A");
        assert_eq!(ranker.select(input, 10).len(), 4);
    }

    #[test]
    fn selection_has_no_duplicates() {
        let ranker = CandidateRanker::new(vec!["WIN".into()], DEFAULT_MIN_BARS);
        let selected = ranker.select(
            universe(&[("WIN", winner()), ("WIN", winner()), ("FLAT", flat())]),
            5,
        );
        let names: Vec<&str> = selected.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(names, vec!["WIN", "FLAT"]);
    }

    #[test]
    fn absent_core_instrument_is_skipped() {
        let ranker = CandidateRanker::new(vec!["MISSING".into(), "EMPTY".into()], DEFAULT_MIN_BARS);
        let selected = ranker.select(
            universe(&[("EMPTY", PriceSeries::empty()), ("FLAT", flat())]),
            5,
        );
        let names: Vec<&str> = selected.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(names, vec!["FLAT"]);
    }

    #[test]
    fn short_core_instrument_is_still_selected() {
        let ranker = CandidateRanker::new(vec!["NEW".into()], DEFAULT_MIN_BARS);
        let short = series_from(&[10.0; 5], &[1.0; 5]);
        let selected = ranker.select(universe(&[("NEW", short), ("FLAT", flat())]), 5);
        assert_eq!(selected[0].symbol, "NEW");
        assert_eq!(selected.len(), 2);
    }
}
