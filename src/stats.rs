//! Rolling-window statistics over a time-ordered numeric sequence.
//!
//! Every function returns a sequence as long as its input. Positions before
//! the window is full are `None`, never zero or NaN.

/// Direction of a two-sample crossover between two series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cross {
    /// `a` went from `<= b` to `> b`.
    Above,
    /// `a` went from `>= b` to `< b`.
    Below,
    None,
}

pub fn rolling_mean(x: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(x, window, |w| Some(mean(w)))
}

/// Sample (n-1) standard deviation over the trailing window.
pub fn rolling_std(x: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(x, window, sample_std)
}

pub fn rolling_max(x: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(x, window, |w| w.iter().copied().reduce(f64::max))
}

pub fn rolling_min(x: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(x, window, |w| w.iter().copied().reduce(f64::min))
}

/// Unadjusted exponential mean seeded with the first observation.
///
/// Defined at every index. A span of zero is treated as one.
pub fn ewm_mean(x: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut out = Vec::with_capacity(x.len());
    let mut prev: Option<f64> = None;
    for &value in x {
        let next = match prev {
            // Same as alpha * value + (1 - alpha) * p, but exact on flat input.
            Some(p) => p + alpha * (value - p),
            None => value,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// Compare the last two points of `a` and `b`.
///
/// Any undefined point among the four yields `Cross::None`.
pub fn crossover(a: &[Option<f64>], b: &[Option<f64>]) -> Cross {
    let (Some(prev_a), Some(curr_a)) = last_two(a) else {
        return Cross::None;
    };
    let (Some(prev_b), Some(curr_b)) = last_two(b) else {
        return Cross::None;
    };
    if curr_a > curr_b && prev_a <= prev_b {
        Cross::Above
    } else if curr_a < curr_b && prev_a >= prev_b {
        Cross::Below
    } else {
        Cross::None
    }
}

pub fn last_defined(x: &[Option<f64>]) -> Option<f64> {
    x.last().copied().flatten()
}

pub fn mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// Sample standard deviation; `None` with fewer than two observations.
pub fn sample_std(x: &[f64]) -> Option<f64> {
    if x.len() < 2 {
        return None;
    }
    let m = mean(x);
    let variance = x.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / (x.len() - 1) as f64;
    Some(variance.sqrt())
}

fn last_two(x: &[Option<f64>]) -> (Option<f64>, Option<f64>) {
    match x {
        [.., prev, curr] => (*prev, *curr),
        _ => (None, None),
    }
}

fn rolling<F>(x: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    if window == 0 {
        return vec![None; x.len()];
    }
    let values: Vec<Option<f64>> = x.windows(window).map(f).collect();
    align_series(x.len(), values)
}

fn align_series(total_len: usize, values: Vec<Option<f64>>) -> Vec<Option<f64>> {
    let offset = total_len.saturating_sub(values.len());
    let mut output = vec![None; total_len];
    for (index, value) in values.into_iter().enumerate() {
        output[offset + index] = value;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(rolling_mean(&[], 3).is_empty());
        assert!(rolling_std(&[], 3).is_empty());
        assert!(rolling_max(&[], 3).is_empty());
        assert!(rolling_min(&[], 3).is_empty());
        assert!(ewm_mean(&[], 3).is_empty());
    }

    #[test]
    fn rolling_mean_has_undefined_prefix() {
        let values = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(values.len(), 4);
        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        assert!(close(values[2].unwrap(), 2.0));
        assert!(close(values[3].unwrap(), 3.0));
    }

    #[test]
    fn window_longer_than_input_is_all_undefined() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 5), vec![None, None]);
    }

    #[test]
    fn zero_window_is_all_undefined() {
        assert_eq!(rolling_max(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn rolling_std_is_sample_std() {
        let values = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        // sum of squared deviations = 32, n-1 = 7
        assert!(close(values[7].unwrap(), (32.0_f64 / 7.0).sqrt()));
    }

    #[test]
    fn rolling_std_single_window_undefined() {
        assert_eq!(rolling_std(&[1.0, 2.0], 1), vec![None, None]);
    }

    #[test]
    fn rolling_extrema() {
        let x = [3.0, 1.0, 4.0, 1.0, 5.0];
        let max = rolling_max(&x, 2);
        let min = rolling_min(&x, 2);
        assert_eq!(max, vec![None, Some(3.0), Some(4.0), Some(4.0), Some(5.0)]);
        assert_eq!(min, vec![None, Some(1.0), Some(1.0), Some(1.0), Some(1.0)]);
    }

    #[test]
    fn ewm_is_seeded_with_first_value() {
        let values = ewm_mean(&[10.0, 20.0, 30.0], 3);
        // alpha = 0.5
        assert!(close(values[0], 10.0));
        assert!(close(values[1], 15.0));
        assert!(close(values[2], 22.5));
    }

    #[test]
    fn ewm_flat_input_stays_flat() {
        for v in ewm_mean(&[7.0; 10], 12) {
            assert!(close(v, 7.0));
        }
    }

    #[test]
    fn crossover_detects_both_directions() {
        let a = [Some(1.0), Some(3.0)];
        let b = [Some(2.0), Some(2.0)];
        assert_eq!(crossover(&a, &b), Cross::Above);
        assert_eq!(crossover(&b, &a), Cross::Below);
    }

    #[test]
    fn crossover_from_equal_counts() {
        let a = [Some(2.0), Some(2.5)];
        let b = [Some(2.0), Some(2.0)];
        assert_eq!(crossover(&a, &b), Cross::Above);
    }

    #[test]
    fn crossover_without_change_is_none() {
        let a = [Some(3.0), Some(4.0)];
        let b = [Some(2.0), Some(2.0)];
        assert_eq!(crossover(&a, &b), Cross::None);
    }

    #[test]
    fn crossover_with_undefined_point_is_none() {
        let a = [None, Some(4.0)];
        let b = [Some(2.0), Some(2.0)];
        assert_eq!(crossover(&a, &b), Cross::None);
        assert_eq!(crossover(&[Some(1.0)], &[Some(0.0)]), Cross::None);
    }

    proptest! {
        #[test]
        fn full_window_mean_is_arithmetic_mean(x in prop::collection::vec(-1e6f64..1e6, 1..200)) {
            let values = rolling_mean(&x, x.len());
            let expected = x.iter().sum::<f64>() / x.len() as f64;
            let got = values.last().copied().flatten().unwrap();
            prop_assert!((got - expected).abs() <= 1e-6 * expected.abs().max(1.0));
        }

        #[test]
        fn outputs_keep_input_length(x in prop::collection::vec(0f64..1e3, 0..100), w in 0usize..20) {
            prop_assert_eq!(rolling_mean(&x, w).len(), x.len());
            prop_assert_eq!(rolling_std(&x, w).len(), x.len());
            prop_assert_eq!(rolling_min(&x, w).len(), x.len());
            prop_assert_eq!(ewm_mean(&x, w).len(), x.len());
        }

        #[test]
        fn rolling_min_never_exceeds_max(x in prop::collection::vec(0f64..1e3, 1..100), w in 1usize..20) {
            for (lo, hi) in rolling_min(&x, w).into_iter().zip(rolling_max(&x, w)) {
                if let (Some(lo), Some(hi)) = (lo, hi) {
                    prop_assert!(lo <= hi);
                }
            }
        }
    }
}
