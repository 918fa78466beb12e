//! Linearly weighted averages: WMA and the Hull moving average built on it.

use crate::{Price, ring_buffer::RingBuffer, warm_up};

/// Weighted mean of the last `length` values with weights `1..=length`,
/// newest heaviest. `NaN` until the window is full and while it holds a
/// `NaN`.
pub(crate) fn weighted(values: &[Price], length: usize) -> Vec<Price> {
    let mut out = warm_up::undefined(values.len());
    let Some(first) = warm_up::first_defined(values) else {
        return out;
    };
    if !warm_up::fits(values.len() - first, length) {
        return out;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = length as f64;
    let denominator = n * (n + 1.0) / 2.0;
    let mut window = RingBuffer::new(length);

    // Weights shift with every bar, so the numerator is rebuilt per window
    // rather than maintained as a running sum.
    for (slot, &value) in out[first..].iter_mut().zip(&values[first..]) {
        window.push(value);

        if window.is_ready() {
            #[allow(clippy::cast_precision_loss)]
            let numerator: Price = window
                .iter()
                .enumerate()
                .map(|(i, v)| (i + 1) as f64 * v)
                .sum();
            *slot = numerator / denominator;
        }
    }

    out
}

/// Hull moving average: `WMA(2·WMA(x, n/2) − WMA(x, n), √n)`.
///
/// Both derived lengths are floored and clamped to at least one bar.
pub(crate) fn hull(values: &[Price], length: usize) -> Vec<Price> {
    let half = (length / 2).max(1);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let root = ((length as f64).sqrt().floor() as usize).max(1);

    let fast = weighted(values, half);
    let slow = weighted(values, length);
    let raw: Vec<Price> = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| 2.0f64.mul_add(*f, -s))
        .collect();

    weighted(&raw, root)
}
