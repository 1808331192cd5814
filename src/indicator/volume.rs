use crate::indicator::Metric;
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSpike {
    Extreme,
    High,
    Normal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeResult {
    /// Mean volume of the `window` bars before the last one.
    pub average: Metric,
    /// Last volume divided by `average`.
    pub ratio: Metric,
    pub spike: Option<VolumeSpike>,
}

pub fn compute(volumes: &[f64], window: usize, high_ratio: f64, extreme_ratio: f64) -> VolumeResult {
    let n = volumes.len();
    let required = window + 1;

    let Some((&current, prior)) = volumes.split_last().filter(|_| window > 0 && n >= required)
    else {
        let insufficient = Metric::Insufficient {
            required,
            available: n,
        };
        return VolumeResult {
            average: insufficient,
            ratio: insufficient,
            spike: None,
        };
    };

    let average = stats::mean(&prior[prior.len() - window..]);
    if average <= 0.0 {
        return VolumeResult {
            average: Metric::Value(average),
            ratio: Metric::Degenerate,
            spike: Some(VolumeSpike::Normal),
        };
    }

    let ratio = current / average;
    let spike = if ratio > extreme_ratio {
        VolumeSpike::Extreme
    } else if ratio > high_ratio {
        VolumeSpike::High
    } else {
        VolumeSpike::Normal
    };

    VolumeResult {
        average: Metric::Value(average),
        ratio: Metric::from_option(Some(ratio), required, n),
        spike: Some(spike),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_last(last: f64) -> Vec<f64> {
        let mut volumes = vec![100.0; 20];
        volumes.push(last);
        volumes
    }

    #[test]
    fn average_excludes_current_bar() {
        let result = compute(&with_last(500.0), 20, 1.5, 2.0);
        assert_eq!(result.average, Metric::Value(100.0));
        assert_eq!(result.ratio, Metric::Value(5.0));
    }

    #[test]
    fn spike_classification() {
        assert_eq!(compute(&with_last(250.0), 20, 1.5, 2.0).spike, Some(VolumeSpike::Extreme));
        assert_eq!(compute(&with_last(180.0), 20, 1.5, 2.0).spike, Some(VolumeSpike::High));
        assert_eq!(compute(&with_last(150.0), 20, 1.5, 2.0).spike, Some(VolumeSpike::Normal));
    }

    #[test]
    fn only_trailing_window_is_averaged() {
        let mut volumes = vec![1_000_000.0; 5];
        volumes.extend(with_last(100.0));
        let result = compute(&volumes, 20, 1.5, 2.0);
        assert_eq!(result.average, Metric::Value(100.0));
    }

    #[test]
    fn zero_average_is_normal() {
        let mut volumes = vec![0.0; 20];
        volumes.push(50.0);
        let result = compute(&volumes, 20, 1.5, 2.0);
        assert_eq!(result.ratio, Metric::Degenerate);
        assert_eq!(result.spike, Some(VolumeSpike::Normal));
    }

    #[test]
    fn short_series_is_insufficient() {
        let result = compute(&[100.0; 20], 20, 1.5, 2.0);
        assert_eq!(
            result.ratio,
            Metric::Insufficient {
                required: 21,
                available: 20
            }
        );
        assert_eq!(result.spike, None);
    }
}
