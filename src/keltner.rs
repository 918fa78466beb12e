use std::{fmt::Display, num::NonZero};

use crate::{
    Hlc, Indicator, IndicatorConfig, IndicatorConfigBuilder, MovingAverage, Multiplier, Price,
    Result, atr, error,
};

const DEFAULT_FACTOR: Multiplier = Multiplier::constant(2.0);

/// Configuration for the [`Keltner`] channel.
///
/// # Example
///
/// ```
/// use recursive_ta::{IndicatorConfig, IndicatorConfigBuilder, KeltnerConfig};
/// use std::num::NonZero;
///
/// let config = KeltnerConfig::builder()
///     .length(NonZero::new(20).unwrap())
///     .upper_factor(2.5)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.upper_factor(), 2.5);
/// assert_eq!(config.lower_factor(), 2.0);
/// let negative = KeltnerConfig::builder()
///     .length(NonZero::new(20).unwrap())
///     .lower_factor(-1.0)
///     .build();
/// assert!(negative.is_err());
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeltnerConfig {
    length: NonZero<usize>,
    smoothing: MovingAverage,
    upper_factor: Multiplier,
    lower_factor: Multiplier,
}

impl IndicatorConfig for KeltnerConfig {
    type Builder = KeltnerConfigBuilder;

    fn builder() -> Self::Builder {
        KeltnerConfigBuilder {
            length: None,
            smoothing: MovingAverage::default(),
            upper_factor: DEFAULT_FACTOR.value(),
            lower_factor: DEFAULT_FACTOR.value(),
        }
    }
}

impl KeltnerConfig {
    /// Channel at ±2 ATR around an SMA.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self {
            length,
            smoothing: MovingAverage::default(),
            upper_factor: DEFAULT_FACTOR,
            lower_factor: DEFAULT_FACTOR,
        }
    }

    /// Window of both the middle line and the ATR.
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
    pub fn upper_factor(&self) -> f64 {
        self.upper_factor.value()
    }

    #[inline]
    #[must_use]
    pub fn lower_factor(&self) -> f64 {
        self.lower_factor.value()
    }
}

impl Display for KeltnerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KeltnerConfig({}, {}, {}, {})",
            self.length, self.smoothing, self.upper_factor, self.lower_factor
        )
    }
}

/// Builder for [`KeltnerConfig`].
///
/// Defaults: smoothing = [`MovingAverage::Sma`], both factors 2. Length is
/// required; factors must be positive.
pub struct KeltnerConfigBuilder {
    length: Option<NonZero<usize>>,
    smoothing: MovingAverage,
    upper_factor: f64,
    lower_factor: f64,
}

impl KeltnerConfigBuilder {
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length);
        self
    }

    /// Smoother for the middle line and the ATR.
    #[must_use]
    pub fn smoothing(mut self, smoothing: MovingAverage) -> Self {
        self.smoothing = smoothing;
        self
    }

    #[must_use]
    pub fn upper_factor(mut self, factor: f64) -> Self {
        self.upper_factor = factor;
        self
    }

    #[must_use]
    pub fn lower_factor(mut self, factor: f64) -> Self {
        self.lower_factor = factor;
        self
    }
}

impl IndicatorConfigBuilder<KeltnerConfig> for KeltnerConfigBuilder {
    fn build(self) -> Result<KeltnerConfig> {
        Ok(KeltnerConfig {
            length: error::required("length", self.length)?,
            smoothing: self.smoothing,
            upper_factor: Multiplier::named("upper_factor", self.upper_factor)?,
            lower_factor: Multiplier::named("lower_factor", self.lower_factor)?,
        })
    }
}

/// Keltner channel bands, index-aligned with the input.
#[derive(Clone, Debug, PartialEq)]
pub struct KeltnerSeries {
    lower: Vec<Price>,
    middle: Vec<Price>,
    upper: Vec<Price>,
}

impl KeltnerSeries {
    /// `middle − lower_factor × ATR`.
    #[must_use]
    pub fn lower(&self) -> &[Price] {
        &self.lower
    }

    /// Moving average of the close.
    #[must_use]
    pub fn middle(&self) -> &[Price] {
        &self.middle
    }

    /// `middle + upper_factor × ATR`.
    #[must_use]
    pub fn upper(&self) -> &[Price] {
        &self.upper
    }
}

/// Keltner channel: a moving average of the close with bands a multiple of
/// the ATR above and below. Middle line and ATR share one smoother and one
/// window.
///
/// # Example
///
/// ```
/// use recursive_ta::{Hlc, Keltner, KeltnerConfig};
/// use std::num::NonZero;
///
/// let high = [11.0, 12.0, 13.0];
/// let low = [9.0, 10.0, 11.0];
/// let close = [10.0, 11.0, 12.0];
/// let hlc = Hlc::new(&high, &low, &close).unwrap();
///
/// let kc = Keltner::new(KeltnerConfig::new(NonZero::new(2).unwrap()));
/// let bands = kc.apply(hlc).unwrap();
///
/// // SMA(close) = 11.5, ATR = 2
/// assert_eq!(bands.middle()[2], 11.5);
/// assert_eq!(bands.upper()[2], 15.5);
/// assert_eq!(bands.lower()[2], 7.5);
/// ```
#[derive(Clone, Debug)]
pub struct Keltner {
    config: KeltnerConfig,
}

impl Indicator for Keltner {
    type Config = KeltnerConfig;
    type Input<'a> = Hlc<'a>;
    type Output = KeltnerSeries;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: Hlc<'_>) -> Result<KeltnerSeries> {
        let (ma, n) = (self.config.smoothing, self.config.length);
        let middle = ma.smooth(input.close(), n)?;
        let atr = ma.smooth(&atr::true_range(input), n)?;

        let (upper_factor, lower_factor) =
            (self.config.upper_factor(), self.config.lower_factor());
        let (lower, upper): (Vec<Price>, Vec<Price>) = middle
            .iter()
            .zip(&atr)
            .map(|(&m, &a)| (lower_factor.mul_add(-a, m), upper_factor.mul_add(a, m)))
            .unzip();

        Ok(KeltnerSeries {
            lower,
            middle,
            upper,
        })
    }
}

impl Display for Keltner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KC({}, {}, {})",
            self.config.length, self.config.upper_factor, self.config.lower_factor
        )
    }
}
