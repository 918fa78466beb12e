use std::{fmt::Display, num::NonZero};

use crate::{
    EmaSeed, Indicator, IndicatorConfig, IndicatorConfigBuilder, MovingAverage, Price, Result,
    error,
};

/// Wilder's original smoothing: SMA seed over the first `length` changes.
const DEFAULT_SMOOTHING: MovingAverage = MovingAverage::Wilders(EmaSeed::Sma);

/// Configuration for the Relative Strength Index ([`Rsi`]).
///
/// Defaults to Wilder's smoothing seeded with the simple average of the
/// first `length` price changes, so output begins at index `length`.
///
/// Bar 0 has no price change and stays out of every window. Tools that
/// count it as a zero change, and default to an SMA of the changes, start
/// one bar earlier and differ throughout; select
/// [`MovingAverage::Sma`] through the builder to match the latter
/// smoothing.
///
/// # Example
///
/// ```
/// use recursive_ta::RsiConfig;
/// use std::num::NonZero;
///
/// let config = RsiConfig::new(NonZero::new(14).unwrap());
/// assert_eq!(config.length(), 14);
/// assert_eq!(config.to_string(), "RsiConfig(14, wilders)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RsiConfig {
    length: NonZero<usize>,
    smoothing: MovingAverage,
}

impl IndicatorConfig for RsiConfig {
    type Builder = RsiConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        RsiConfigBuilder {
            length: None,
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

impl RsiConfig {
    /// RSI with Wilder's smoothing.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self {
            length,
            smoothing: DEFAULT_SMOOTHING,
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

impl Display for RsiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RsiConfig({}, {})", self.length, self.smoothing)
    }
}

/// Builder for [`RsiConfig`].
///
/// Defaults: smoothing = Wilder's with an SMA seed. Length is required.
pub struct RsiConfigBuilder {
    length: Option<NonZero<usize>>,
    smoothing: MovingAverage,
}

impl RsiConfigBuilder {
    /// Sets the smoothing length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length);
        self
    }

    /// Sets the smoother applied to gains and losses.
    #[inline]
    #[must_use]
    pub fn smoothing(mut self, smoothing: MovingAverage) -> Self {
        self.smoothing = smoothing;
        self
    }
}

impl IndicatorConfigBuilder<RsiConfig> for RsiConfigBuilder {
    fn build(self) -> Result<RsiConfig> {
        Ok(RsiConfig {
            length: error::required("length", self.length)?,
            smoothing: self.smoothing,
        })
    }
}

/// Relative Strength Index (RSI).
///
/// Momentum oscillator in `[0, 100]` comparing average gains to average
/// losses:
///
/// ```text
/// gain[i] = max(x[i] − x[i − 1], 0)
/// loss[i] = max(x[i − 1] − x[i], 0)
/// RSI     = 100 − 100 / (1 + MA(gain) / MA(loss))
/// ```
///
/// When the average loss is zero the RSI is 100. Index 0 has no price
/// change and is always `NaN`.
///
/// # Example
///
/// ```
/// use recursive_ta::{Rsi, RsiConfig};
/// use std::num::NonZero;
///
/// let rsi = Rsi::new(RsiConfig::new(NonZero::new(2).unwrap()));
/// let out = rsi.apply(&[10.0, 11.0, 10.0, 12.0]).unwrap();
///
/// assert!(out[0].is_nan() && out[1].is_nan());
/// // gains 1, 0 / losses 0, 1 → equal averages
/// assert_eq!(out[2], 50.0);
/// ```
#[derive(Clone, Debug)]
pub struct Rsi {
    config: RsiConfig,
}

impl Indicator for Rsi {
    type Config = RsiConfig;
    type Input<'a> = &'a [Price];
    type Output = Vec<Price>;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: &[Price]) -> Result<Vec<Price>> {
        let (gains, losses): (Vec<Price>, Vec<Price>) = (0..input.len())
            .map(|i| match i.checked_sub(1) {
                None => (f64::NAN, f64::NAN),
                Some(p) => {
                    let change = input[i] - input[p];
                    (change.max(0.0), (-change).max(0.0))
                }
            })
            .unzip();

        let ma = self.config.smoothing;
        let avg_gain = ma.smooth(&gains, self.config.length)?;
        let avg_loss = ma.smooth(&losses, self.config.length)?;

        Ok(avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&up, &down)| strength_index(up, down))
            .collect())
    }
}

#[inline]
fn strength_index(avg_gain: Price, avg_loss: Price) -> Price {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

impl Display for Rsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RSI({})", self.config.length)
    }
}
