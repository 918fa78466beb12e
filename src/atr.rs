use std::{fmt::Display, num::NonZero};

use crate::{
    Hlc, Indicator, IndicatorConfig, IndicatorConfigBuilder, MovingAverage, Price, Result, error,
    price_source,
};

/// Per-bar true range.
///
/// Bar 0 has no previous close and yields `high − low`; later bars take
/// `max(high − low, |high − close[i−1]|, |low − close[i−1]|)`.
///
/// ```
/// use recursive_ta::{Hlc, true_range};
///
/// let hlc = Hlc::new(&[20.0, 22.0], &[5.0, 12.0], &[15.0, 18.0]).unwrap();
/// assert_eq!(true_range(hlc), vec![15.0, 10.0]);
/// ```
#[must_use]
pub fn true_range(hlc: Hlc<'_>) -> Vec<Price> {
    let (high, low, close) = (hlc.high(), hlc.low(), hlc.close());

    (0..hlc.len())
        .map(|i| {
            let prev_close = i.checked_sub(1).map(|p| close[p]);
            price_source::true_range(high[i], low[i], prev_close)
        })
        .collect()
}

/// Configuration for the Average True Range ([`Atr`]).
///
/// ```
/// use recursive_ta::{AtrConfig, IndicatorConfig, IndicatorConfigBuilder, MovingAverage};
/// use std::num::NonZero;
///
/// let config = AtrConfig::builder()
///     .length(NonZero::new(14).unwrap())
///     .smoothing(MovingAverage::WILDERS)
///     .build()
///     .unwrap();
/// assert_eq!(config.to_string(), "AtrConfig(14, wilders)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AtrConfig {
    length: NonZero<usize>,
    smoothing: MovingAverage,
}

impl IndicatorConfig for AtrConfig {
    type Builder = AtrConfigBuilder;

    fn builder() -> Self::Builder {
        AtrConfigBuilder {
            length: None,
            smoothing: MovingAverage::default(),
        }
    }
}

impl AtrConfig {
    /// ATR smoothed with an SMA.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self {
            length,
            smoothing: MovingAverage::default(),
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

impl Display for AtrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AtrConfig({}, {})", self.length, self.smoothing)
    }
}

/// Builder for [`AtrConfig`].
///
/// Defaults: smoothing = [`MovingAverage::Sma`]. Length is required.
pub struct AtrConfigBuilder {
    length: Option<NonZero<usize>>,
    smoothing: MovingAverage,
}

impl AtrConfigBuilder {
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

impl IndicatorConfigBuilder<AtrConfig> for AtrConfigBuilder {
    fn build(self) -> Result<AtrConfig> {
        Ok(AtrConfig {
            length: error::required("length", self.length)?,
            smoothing: self.smoothing,
        })
    }
}

/// Average True Range: [`true_range`] smoothed with the configured
/// [`MovingAverage`].
///
/// ```
/// use recursive_ta::{Atr, AtrConfig, Hlc};
/// use std::num::NonZero;
///
/// let hlc = Hlc::new(&[11.0, 12.0, 13.0], &[9.0, 10.0, 11.0], &[10.0, 11.0, 12.0]).unwrap();
/// let atr = Atr::new(AtrConfig::new(NonZero::new(2).unwrap())).apply(hlc).unwrap();
///
/// assert!(atr[0].is_nan());
/// assert_eq!(&atr[1..], &[2.0, 2.0]);
/// ```
#[derive(Clone, Debug)]
pub struct Atr {
    config: AtrConfig,
}

impl Indicator for Atr {
    type Config = AtrConfig;
    type Input<'a> = Hlc<'a>;
    type Output = Vec<Price>;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: Hlc<'_>) -> Result<Vec<Price>> {
        self.config
            .smoothing
            .smooth(&true_range(input), self.config.length)
    }
}

impl Display for Atr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ATR({}, {})", self.config.length, self.config.smoothing)
    }
}
