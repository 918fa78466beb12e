use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, MovingAverage, Price, Result, error,
    warm_up,
};

/// Configuration for the triple-smoothed rate of change ([`Trix`]).
///
/// ```
/// use recursive_ta::{IndicatorConfig, IndicatorConfigBuilder, TrixConfig};
/// use std::num::NonZero;
///
/// let config = TrixConfig::builder()
///     .length(NonZero::new(15).unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(config.to_string(), "TrixConfig(15, ema)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrixConfig {
    length: NonZero<usize>,
    smoothing: MovingAverage,
}

impl IndicatorConfig for TrixConfig {
    type Builder = TrixConfigBuilder;

    fn builder() -> Self::Builder {
        TrixConfigBuilder {
            length: None,
            smoothing: MovingAverage::EMA,
        }
    }
}

impl TrixConfig {
    /// TRIX over three EMAs.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self {
            length,
            smoothing: MovingAverage::EMA,
        }
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }

    #[inline]
    #[must_use]
    pub fn smoothing(&self) -> MovingAverage {
        self.smoothing
    }
}

impl Display for TrixConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TrixConfig({}, {})", self.length, self.smoothing)
    }
}

/// Builder for [`TrixConfig`].
///
/// Defaults: smoothing = [`MovingAverage::EMA`]. Length is required.
pub struct TrixConfigBuilder {
    length: Option<NonZero<usize>>,
    smoothing: MovingAverage,
}

impl TrixConfigBuilder {
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length);
        self
    }

    #[must_use]
    pub fn smoothing(mut self, smoothing: MovingAverage) -> Self {
        self.smoothing = smoothing;
        self
    }
}

impl IndicatorConfigBuilder<TrixConfig> for TrixConfigBuilder {
    fn build(self) -> Result<TrixConfig> {
        Ok(TrixConfig {
            length: error::required("length", self.length)?,
            smoothing: self.smoothing,
        })
    }
}

/// TRIX: one-bar rate of change of a triple-smoothed series.
///
/// ```text
/// m3[i]   = MA(MA(MA(x, n), n), n)[i]
/// TRIX[i] = m3[i] / m3[i − 1] − 1
/// ```
///
/// Index 0 is always `NaN`; a warm-up in the smoother extends that prefix.
/// A zero `m3[i − 1]` divides through to `±∞` or `NaN`.
///
/// ```
/// use recursive_ta::{Trix, TrixConfig};
/// use std::num::NonZero;
///
/// let trix = Trix::new(TrixConfig::new(NonZero::new(1).unwrap()));
/// let out = trix.apply(&[100.0, 110.0, 99.0]).unwrap();
///
/// assert!(out[0].is_nan());
/// assert!((out[1] - 0.1).abs() < 1e-12);
/// assert!((out[2] + 0.1).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct Trix {
    config: TrixConfig,
}

impl Indicator for Trix {
    type Config = TrixConfig;
    type Input<'a> = &'a [Price];
    type Output = Vec<Price>;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: &[Price]) -> Result<Vec<Price>> {
        let (ma, n) = (self.config.smoothing, self.config.length);
        let m1 = ma.smooth(input, n)?;
        let m2 = ma.smooth(&m1, n)?;
        let m3 = ma.smooth(&m2, n)?;

        let mut out = warm_up::undefined(m3.len());
        for (slot, pair) in out.iter_mut().skip(1).zip(m3.windows(2)) {
            *slot = pair[1] / pair[0] - 1.0;
        }

        Ok(out)
    }
}

impl Display for Trix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TRIX({}, {})", self.config.length, self.config.smoothing)
    }
}
