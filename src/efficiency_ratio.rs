use std::num::NonZero;

use crate::{Price, Result, error, ring_buffer::WindowSum, warm_up};

/// Kaufman efficiency ratio over a window of `length` bar-to-bar changes.
///
/// ```text
/// ER[i] = |x[i] − x[i − n]| / Σ |x[j] − x[j − 1]|,  j = i − n + 1 ..= i
/// ```
///
/// `1` for a straight move, near `0` for noise. A flat window (no movement at
/// all) has ratio `0`. The first `length` positions after any input `NaN`
/// prefix are `NaN`.
///
/// ```
/// use recursive_ta::efficiency_ratio;
///
/// let er = efficiency_ratio(&[1.0, 2.0, 3.0, 2.0], 2).unwrap();
/// assert!(er[0].is_nan() && er[1].is_nan());
/// assert_eq!(er[2], 1.0);
/// assert_eq!(er[3], 0.0);
/// ```
///
/// # Errors
///
/// [`Error::InvalidParameter`](crate::Error::InvalidParameter) if `length`
/// is zero.
pub fn efficiency_ratio(values: &[Price], length: usize) -> Result<Vec<Price>> {
    let length = error::window("length", length)?;
    Ok(ratio(values, length))
}

pub(crate) fn ratio(values: &[Price], length: NonZero<usize>) -> Vec<Price> {
    let n = length.get();
    let mut out = warm_up::undefined(values.len());
    let Some(first) = warm_up::first_defined(values) else {
        return out;
    };
    // n changes need n + 1 values.
    if !warm_up::fits(values.len() - first - 1, n) {
        return out;
    }

    let mut volatility = WindowSum::new(n);

    for i in first + 1..values.len() {
        let total = volatility.push((values[i] - values[i - 1]).abs());

        if let Some(total) = total {
            let direction = (values[i] - values[i - n]).abs();
            out[i] = if total == 0.0 {
                0.0
            } else {
                (direction / total).min(1.0)
            };
        }
    }

    out
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{Error, test_util::nan_prefix};

    #[test]
    fn rejects_zero_length() {
        assert!(matches!(
            efficiency_ratio(&[1.0, 2.0], 0),
            Err(Error::InvalidParameter { name: "length", .. })
        ));
    }

    #[test]
    fn window_longer_than_changes_is_all_nan() {
        let er = efficiency_ratio(&[1.0, 2.0, 3.0], 3).unwrap();
        assert_eq!(nan_prefix(&er), 3);
        let er = efficiency_ratio(&[1.0, 2.0, 3.0], usize::MAX).unwrap();
        assert_eq!(nan_prefix(&er), 3);
    }

    #[test]
    fn warm_up_is_length_bars() {
        let input: Vec<f64> = (0..10).map(f64::from).collect();
        let er = efficiency_ratio(&input, 4).unwrap();
        assert_eq!(nan_prefix(&er), 4);
    }

    #[test]
    fn trending_window_is_one() {
        let input: Vec<f64> = (0..10).map(|i| f64::from(i) * 1.5).collect();
        let er = efficiency_ratio(&input, 3).unwrap();
        assert!(er[3..].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn choppy_window() {
        // |14 − 10| / (2 + 1 + 3) = 4 / 6
        let er = efficiency_ratio(&[10.0, 12.0, 11.0, 14.0], 3).unwrap();
        assert!((er[3] - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn flat_window_is_zero() {
        let er = efficiency_ratio(&[5.0; 6], 2).unwrap();
        assert_eq!(&er[2..], &[0.0; 4]);
    }

    #[test]
    fn short_input_is_all_nan() {
        let er = efficiency_ratio(&[1.0, 2.0, 3.0], 3).unwrap();
        assert_eq!(nan_prefix(&er), 3);
    }

    #[test]
    fn nan_prefix_delays_window() {
        let er = efficiency_ratio(&[f64::NAN, 1.0, 2.0, 3.0], 2).unwrap();
        assert_eq!(nan_prefix(&er), 3);
        assert_eq!(er[3], 1.0);
    }
}
