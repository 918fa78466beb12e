use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Price, Result, error,
    ring_buffer::WindowSum, warm_up,
};

/// Rolling mean of the last `length` values; `NaN` until the window is full
/// and while a `NaN` sits inside it.
pub(crate) fn simple(values: &[Price], length: usize) -> Vec<Price> {
    let mut out = warm_up::undefined(values.len());
    let Some(first) = warm_up::first_defined(values) else {
        return out;
    };
    if !warm_up::fits(values.len() - first, length) {
        return out;
    }

    #[allow(clippy::cast_precision_loss)]
    let length_reciprocal = 1.0 / length as f64;
    let mut window = WindowSum::new(length);

    for (slot, &value) in out[first..].iter_mut().zip(&values[first..]) {
        if let Some(sum) = window.push(value) {
            *slot = sum * length_reciprocal;
        }
    }

    out
}

/// Configuration for the Simple Moving Average ([`Sma`]) indicator.
///
/// # Example
///
/// ```rust
/// use recursive_ta::SmaConfig;
/// use std::num::NonZero;
///
/// let config = SmaConfig::new(NonZero::new(20).unwrap());
/// assert_eq!(config.length(), 20);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SmaConfig {
    length: NonZero<usize>,
}

impl IndicatorConfig for SmaConfig {
    type Builder = SmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        SmaConfigBuilder { length: None }
    }
}

impl SmaConfig {
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self { length }
    }

    /// Window length (number of bars).
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }
}

impl Display for SmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SmaConfig({})", self.length)
    }
}

/// Builder for [`SmaConfig`].
///
/// Length must be set before calling [`build`](IndicatorConfigBuilder::build).
pub struct SmaConfigBuilder {
    length: Option<NonZero<usize>>,
}

impl SmaConfigBuilder {
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length);
        self
    }
}

impl IndicatorConfigBuilder<SmaConfig> for SmaConfigBuilder {
    #[inline]
    fn build(self) -> Result<SmaConfig> {
        Ok(SmaConfig {
            length: error::required("length", self.length)?,
        })
    }
}

/// Simple Moving Average (SMA).
///
/// Computes the unweighted mean of the last *n* values, where *n* is the
/// configured window length. The first `n - 1` positions are `NaN`.
///
/// Uses a running sum for O(1) updates per bar.
///
/// # Example
///
/// ```rust
/// use recursive_ta::{Sma, SmaConfig};
/// use std::num::NonZero;
///
/// let sma = Sma::new(SmaConfig::new(NonZero::new(3).unwrap()));
/// let out = sma.apply(&[10.0, 20.0, 30.0, 40.0]).unwrap();
///
/// assert!(out[0].is_nan() && out[1].is_nan());
/// assert_eq!(&out[2..], &[20.0, 30.0]);
/// ```
#[derive(Clone, Debug)]
pub struct Sma {
    config: SmaConfig,
}

impl Indicator for Sma {
    type Config = SmaConfig;
    type Input<'a> = &'a [Price];
    type Output = Vec<Price>;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: &[Price]) -> Result<Vec<Price>> {
        Ok(simple(input, self.config.length()))
    }
}

impl Display for Sma {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SMA({})", self.config.length)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_util::{assert_series, nan_prefix, nz};

    fn sma(length: usize) -> Sma {
        Sma::new(SmaConfig::new(nz(length)))
    }

    mod filling {
        use super::*;

        #[test]
        fn nan_until_window_full() {
            let out = sma(3).apply(&[10.0, 20.0, 30.0]).unwrap();
            assert_eq!(nan_prefix(&out), 2);
            assert_eq!(out[2], 20.0);
        }

        #[test]
        fn short_input_is_all_nan() {
            let out = sma(4).apply(&[1.0, 2.0]).unwrap();
            assert_eq!(out.len(), 2);
            assert_eq!(nan_prefix(&out), 2);
        }

        #[test]
        fn window_follows_nan_prefix() {
            let out = sma(2).apply(&[f64::NAN, 2.0, 4.0, 6.0]).unwrap();
            assert_series(&out, &[f64::NAN, f64::NAN, 3.0, 5.0], 0.0);
        }
    }

    mod sliding {
        use super::*;

        #[test]
        fn drops_oldest_on_advance() {
            let out = sma(2).apply(&[10.0, 20.0, 30.0, 40.0, 50.0]).unwrap();
            assert_series(&out, &[f64::NAN, 15.0, 25.0, 35.0, 45.0], 0.0);
        }

        #[test]
        fn recovers_after_interior_nan() {
            let out = sma(2).apply(&[1.0, 3.0, f64::NAN, 5.0, 7.0]).unwrap();
            assert_series(&out, &[f64::NAN, 2.0, f64::NAN, f64::NAN, 6.0], 0.0);
        }

        #[test]
        fn length_one_is_identity() {
            let input = [3.5, -1.0, 8.25];
            assert_eq!(sma(1).apply(&input).unwrap(), input.to_vec());
        }
    }

    mod config {
        use super::*;
        use crate::Error;

        #[test]
        fn build_requires_length() {
            assert!(matches!(
                SmaConfig::builder().build(),
                Err(Error::InvalidParameter { name: "length", .. })
            ));
        }

        #[test]
        fn builder_sets_length() {
            let config = SmaConfig::builder().length(nz(7)).build().unwrap();
            assert_eq!(config, SmaConfig::new(nz(7)));
        }
    }

    mod display {
        use super::*;

        #[test]
        fn formats_correctly() {
            assert_eq!(sma(20).to_string(), "SMA(20)");
            assert_eq!(SmaConfig::new(nz(20)).to_string(), "SmaConfig(20)");
        }
    }
}
