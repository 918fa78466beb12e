//! Numeric edge-case policy shared by every indicator.
//!
//! Outputs are always as long as their input. Positions without enough
//! history hold `NaN`, and a `NaN` prefix on an input (the warm-up of an
//! upstream indicator) delays seeding instead of poisoning the result.

use crate::Price;

/// Output buffer of `len` undefined values.
#[inline]
pub(crate) fn undefined(len: usize) -> Vec<Price> {
    vec![Price::NAN; len]
}

/// Index of the first defined (non-NaN) value.
#[inline]
pub(crate) fn first_defined(values: &[Price]) -> Option<usize> {
    values.iter().position(|v| !v.is_nan())
}

/// Index at which the `n`-th defined value (1-based) following any
/// leading NaN prefix sits, i.e. the first position where a window of `n`
/// can be complete.
#[inline]
pub(crate) fn window_start(values: &[Price], n: usize) -> Option<usize> {
    let first = first_defined(values)?;
    fits(values.len() - first, n).then(|| first + n - 1)
}

/// Whether `available` values can fill a window of `n`. Checked before any
/// window-sized allocation, so an oversized window costs nothing.
#[inline]
pub(crate) fn fits(available: usize, n: usize) -> bool {
    n > 0 && n <= available
}
