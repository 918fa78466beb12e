use std::{fmt::Display, num::NonZero};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, MovingAverage, Multiplier, Price, Result,
    error, ring_buffer::WindowSum, warm_up,
};

const DEFAULT_FACTOR: Multiplier = Multiplier::constant(2.0);

/// Divisor of the squared deviations in the window.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Deviation {
    /// Divide by `length`.
    Population,
    /// Divide by `length − 1`. Undefined for a one-bar window.
    #[default]
    Sample,
}

impl Deviation {
    /// `None` when no degrees of freedom are left.
    #[allow(clippy::cast_precision_loss)]
    fn divisor(self, length: usize) -> Option<f64> {
        match self {
            Self::Population => Some(length as f64),
            Self::Sample => (length > 1).then(|| (length - 1) as f64),
        }
    }
}

impl Display for Deviation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Population => write!(f, "population"),
            Self::Sample => write!(f, "sample"),
        }
    }
}

/// Rolling standard deviation of the last `length` values; `NaN` until the
/// window is full and while a `NaN` sits inside it.
fn rolling_deviation(values: &[Price], length: usize, deviation: Deviation) -> Vec<Price> {
    let mut out = warm_up::undefined(values.len());
    let Some(first) = warm_up::first_defined(values) else {
        return out;
    };
    let Some(divisor) = deviation.divisor(length) else {
        return out;
    };
    if !warm_up::fits(values.len() - first, length) {
        return out;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = length as f64;
    let mut sum = WindowSum::new(length);
    let mut sum_sq = WindowSum::new(length);

    for (slot, &value) in out[first..].iter_mut().zip(&values[first..]) {
        let (Some(s), Some(sq)) = (sum.push(value), sum_sq.push(value * value)) else {
            continue;
        };
        // Rounding in the running sums can push a flat window slightly negative.
        let variance = ((sq - s * s / n) / divisor).max(0.0);
        *slot = variance.sqrt();
    }

    out
}

/// Configuration for the Bollinger Bands ([`Bb`]) indicator.
///
/// Defaults to an SMA middle band, the sample standard deviation and bands
/// two deviations either side.
///
/// # Example
///
/// ```
/// use recursive_ta::{BbConfig, Deviation, IndicatorConfig, IndicatorConfigBuilder};
/// use std::num::NonZero;
///
/// let config = BbConfig::builder()
///     .length(NonZero::new(20).unwrap())
///     .deviation(Deviation::Population)
///     .upper_factor(2.5)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.length(), 20);
/// assert_eq!(config.lower_factor(), 2.0);
/// assert_eq!(config.to_string(), "BbConfig(20, sma, population, 2.5, 2)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BbConfig {
    length: NonZero<usize>,
    smoothing: MovingAverage,
    deviation: Deviation,
    upper_factor: Multiplier,
    lower_factor: Multiplier,
}

impl IndicatorConfig for BbConfig {
    type Builder = BbConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        BbConfigBuilder {
            length: None,
            smoothing: MovingAverage::default(),
            deviation: Deviation::default(),
            upper_factor: DEFAULT_FACTOR.value(),
            lower_factor: DEFAULT_FACTOR.value(),
        }
    }
}

impl BbConfig {
    /// BB over `length` bars: SMA, sample deviation, 2σ.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self {
            length,
            smoothing: MovingAverage::default(),
            deviation: Deviation::default(),
            upper_factor: DEFAULT_FACTOR,
            lower_factor: DEFAULT_FACTOR,
        }
    }

    /// Window of both the middle band and the deviation.
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

    #[inline]
    #[must_use]
    pub fn deviation(&self) -> Deviation {
        self.deviation
    }

    #[inline]
    #[must_use]
    pub fn upper_factor(&self) -> f64 {
        self.upper_factor.value()
    }

    #[inline]
    #[must_use]
    pub fn lower_factor(&self) -> f64 {
        self.lower_factor.value()
    }
}

impl Display for BbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BbConfig({}, {}, {}, {}, {})",
            self.length, self.smoothing, self.deviation, self.upper_factor, self.lower_factor
        )
    }
}

/// Builder for [`BbConfig`].
///
/// Defaults: smoothing = [`MovingAverage::Sma`], deviation =
/// [`Deviation::Sample`], both factors 2. Length is required; factors must be
/// positive.
pub struct BbConfigBuilder {
    length: Option<NonZero<usize>>,
    smoothing: MovingAverage,
    deviation: Deviation,
    upper_factor: f64,
    lower_factor: f64,
}

impl BbConfigBuilder {
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length);
        self
    }

    /// Smoother for the middle band.
    #[inline]
    #[must_use]
    pub fn smoothing(mut self, smoothing: MovingAverage) -> Self {
        self.smoothing = smoothing;
        self
    }

    #[inline]
    #[must_use]
    pub fn deviation(mut self, deviation: Deviation) -> Self {
        self.deviation = deviation;
        self
    }

    /// Standard deviations above the middle band.
    #[inline]
    #[must_use]
    pub fn upper_factor(mut self, factor: f64) -> Self {
        self.upper_factor = factor;
        self
    }

    /// Standard deviations below the middle band.
    #[inline]
    #[must_use]
    pub fn lower_factor(mut self, factor: f64) -> Self {
        self.lower_factor = factor;
        self
    }
}

impl IndicatorConfigBuilder<BbConfig> for BbConfigBuilder {
    fn build(self) -> Result<BbConfig> {
        Ok(BbConfig {
            length: error::required("length", self.length)?,
            smoothing: self.smoothing,
            deviation: self.deviation,
            upper_factor: Multiplier::named("upper_factor", self.upper_factor)?,
            lower_factor: Multiplier::named("lower_factor", self.lower_factor)?,
        })
    }
}

/// Bollinger Bands output: lower, middle and upper bands, index-aligned with
/// the input.
///
/// ```text
/// upper = middle + upper_factor × σ
/// lower = middle − lower_factor × σ
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BbSeries {
    lower: Vec<Price>,
    middle: Vec<Price>,
    upper: Vec<Price>,
}

impl BbSeries {
    #[must_use]
    pub fn lower(&self) -> &[Price] {
        &self.lower
    }

    /// Moving average of the input.
    #[must_use]
    pub fn middle(&self) -> &[Price] {
        &self.middle
    }

    #[must_use]
    pub fn upper(&self) -> &[Price] {
        &self.upper
    }

    /// Band width (`upper − lower`) per bar.
    #[must_use]
    pub fn width(&self) -> Vec<Price> {
        self.upper
            .iter()
            .zip(&self.lower)
            .map(|(u, l)| u - l)
            .collect()
    }
}

/// Bollinger Bands (BB).
///
/// A moving average with bands a multiple of the rolling standard deviation
/// above and below. The deviation always covers the last `length` values;
/// the smoother only moves the middle band. Bands are `NaN` until both are
/// defined, and a sample deviation over one bar is always `NaN`.
///
/// # Example
///
/// ```
/// use recursive_ta::{Bb, BbConfig};
/// use std::num::NonZero;
///
/// let bb = Bb::new(BbConfig::new(NonZero::new(3).unwrap()));
/// let bands = bb.apply(&[10.0, 20.0, 30.0, 40.0]).unwrap();
///
/// assert!(bands.middle()[1].is_nan());
/// // mean 20, sample σ = 10
/// assert_eq!(bands.middle()[2], 20.0);
/// assert_eq!(bands.upper()[2], 40.0);
/// assert_eq!(bands.lower()[2], 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct Bb {
    config: BbConfig,
}

impl Indicator for Bb {
    type Config = BbConfig;
    type Input<'a> = &'a [Price];
    type Output = BbSeries;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: &[Price]) -> Result<BbSeries> {
        let n = self.config.length;
        let middle = self.config.smoothing.smooth(input, n)?;
        let sigma = rolling_deviation(input, n.get(), self.config.deviation);

        let (upper_factor, lower_factor) =
            (self.config.upper_factor(), self.config.lower_factor());
        let (lower, upper): (Vec<Price>, Vec<Price>) = middle
            .iter()
            .zip(&sigma)
            .map(|(&m, &s)| (lower_factor.mul_add(-s, m), upper_factor.mul_add(s, m)))
            .unzip();

        Ok(BbSeries {
            lower,
            middle,
            upper,
        })
    }
}

impl Display for Bb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BB({}, {}, {})",
            self.config.length, self.config.upper_factor, self.config.lower_factor
        )
    }
}
