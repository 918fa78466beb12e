use std::{fmt::Display, num::NonZero};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, MovingAverage, Price, Result,
};

const DEFAULT_FAST: NonZero<usize> = NonZero::new(12).unwrap();
const DEFAULT_SLOW: NonZero<usize> = NonZero::new(26).unwrap();
const DEFAULT_SIGNAL: NonZero<usize> = NonZero::new(9).unwrap();

/// Configuration for the Moving Average Convergence Divergence ([`Macd`]).
///
/// ```
/// use recursive_ta::{IndicatorConfig, IndicatorConfigBuilder, MacdConfig};
/// use std::num::NonZero;
///
/// let config = MacdConfig::builder().build().unwrap();
/// assert_eq!(config.to_string(), "MacdConfig(12, 26, 9, ema)");
///
/// let inverted = MacdConfig::builder().fast(NonZero::new(30).unwrap()).build();
/// assert!(inverted.is_err());
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacdConfig {
    fast: NonZero<usize>,
    slow: NonZero<usize>,
    signal: NonZero<usize>,
    smoothing: MovingAverage,
}

impl IndicatorConfig for MacdConfig {
    type Builder = MacdConfigBuilder;

    fn builder() -> Self::Builder {
        let MacdConfig {
            fast,
            slow,
            signal,
            smoothing,
        } = Self::default();

        MacdConfigBuilder {
            fast,
            slow,
            signal,
            smoothing,
        }
    }
}

impl MacdConfig {
    #[inline]
    #[must_use]
    pub fn fast(&self) -> usize {
        self.fast.get()
    }

    #[inline]
    #[must_use]
    pub fn slow(&self) -> usize {
        self.slow.get()
    }

    #[inline]
    #[must_use]
    pub fn signal(&self) -> usize {
        self.signal.get()
    }

    #[inline]
    #[must_use]
    pub fn smoothing(&self) -> MovingAverage {
        self.smoothing
    }
}

impl Default for MacdConfig {
    /// The classic 12 / 26 / 9 EMA setup.
    fn default() -> Self {
        Self {
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
            signal: DEFAULT_SIGNAL,
            smoothing: MovingAverage::EMA,
        }
    }
}

impl Display for MacdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MacdConfig({}, {}, {}, {})",
            self.fast, self.slow, self.signal, self.smoothing
        )
    }
}

/// Builder for [`MacdConfig`].
///
/// Defaults: 12 / 26 / 9 with [`MovingAverage::EMA`]. Requires
/// `fast < slow`.
pub struct MacdConfigBuilder {
    fast: NonZero<usize>,
    slow: NonZero<usize>,
    signal: NonZero<usize>,
    smoothing: MovingAverage,
}

impl MacdConfigBuilder {
    #[must_use]
    pub fn fast(mut self, fast: NonZero<usize>) -> Self {
        self.fast = fast;
        self
    }

    #[must_use]
    pub fn slow(mut self, slow: NonZero<usize>) -> Self {
        self.slow = slow;
        self
    }

    #[must_use]
    pub fn signal(mut self, signal: NonZero<usize>) -> Self {
        self.signal = signal;
        self
    }

    #[must_use]
    pub fn smoothing(mut self, smoothing: MovingAverage) -> Self {
        self.smoothing = smoothing;
        self
    }
}

impl IndicatorConfigBuilder<MacdConfig> for MacdConfigBuilder {
    fn build(self) -> Result<MacdConfig> {
        if self.fast >= self.slow {
            return Err(Error::invalid(
                "fast",
                format!("must be below slow ({}), got {}", self.slow, self.fast),
            ));
        }

        Ok(MacdConfig {
            fast: self.fast,
            slow: self.slow,
            signal: self.signal,
            smoothing: self.smoothing,
        })
    }
}

/// MACD line and its signal line, index-aligned with the input.
#[derive(Clone, Debug, PartialEq)]
pub struct MacdSeries {
    macd: Vec<Price>,
    signal: Vec<Price>,
}

impl MacdSeries {
    /// `MA(fast) − MA(slow)`.
    #[must_use]
    pub fn macd(&self) -> &[Price] {
        &self.macd
    }

    /// Moving average of the MACD line.
    #[must_use]
    pub fn signal(&self) -> &[Price] {
        &self.signal
    }

    /// `macd − signal` per bar.
    #[must_use]
    pub fn histogram(&self) -> Vec<Price> {
        self.macd
            .iter()
            .zip(&self.signal)
            .map(|(m, s)| m - s)
            .collect()
    }
}

/// Moving Average Convergence Divergence (MACD).
///
/// Difference of a fast and a slow moving average of price, plus a signal
/// line that smooths the difference. Any smoother from [`MovingAverage`]
/// can drive all three averages.
///
/// ```
/// use recursive_ta::{Macd, MacdConfig};
///
/// let macd = Macd::new(MacdConfig::default());
/// let out = macd.apply(&[100.0; 40]).unwrap();
///
/// assert!(out.macd().iter().all(|v| v.abs() < 1e-9));
/// assert_eq!(out.signal().len(), 40);
/// ```
#[derive(Clone, Debug)]
pub struct Macd {
    config: MacdConfig,
}

impl Indicator for Macd {
    type Config = MacdConfig;
    type Input<'a> = &'a [Price];
    type Output = MacdSeries;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: &[Price]) -> Result<MacdSeries> {
        let ma = self.config.smoothing;
        let fast = ma.smooth(input, self.config.fast)?;
        let slow = ma.smooth(input, self.config.slow)?;

        let macd: Vec<Price> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ma.smooth(&macd, self.config.signal)?;

        Ok(MacdSeries { macd, signal })
    }
}

impl Display for Macd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MACD({}, {}, {})",
            self.config.fast, self.config.slow, self.config.signal
        )
    }
}
