// src/test_util.rs

use std::num::NonZero;

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e) = ($actual, $expected);
        assert!(
            (a - e).abs() <= e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;

pub fn nz(n: usize) -> NonZero<usize> {
    NonZero::new(n).unwrap()
}

/// Element-wise comparison where `NaN` only matches `NaN`.
pub fn assert_series(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");

    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        if e.is_nan() {
            assert!(a.is_nan(), "index {i}: expected NaN, got {a}");
        } else {
            assert!(
                (a - e).abs() <= tolerance,
                "index {i}: expected {e}, got {a}, diff {}",
                (a - e).abs()
            );
        }
    }
}

/// Number of leading `NaN` values.
pub fn nan_prefix(values: &[f64]) -> usize {
    values.iter().take_while(|v| v.is_nan()).count()
}

/// Owned high/low/close columns for building [`Hlc`](crate::Hlc) views.
pub struct Columns {
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl Columns {
    pub fn from_rows(rows: &[(f64, f64, f64)]) -> Self {
        Self {
            high: rows.iter().map(|r| r.0).collect(),
            low: rows.iter().map(|r| r.1).collect(),
            close: rows.iter().map(|r| r.2).collect(),
        }
    }

    /// Bars whose high, low and close all equal `value`.
    pub fn flat(value: f64, len: usize) -> Self {
        Self::from_rows(&vec![(value, value, value); len])
    }

    pub fn hlc(&self) -> crate::Hlc<'_> {
        crate::Hlc::new(&self.high, &self.low, &self.close).unwrap()
    }
}
