use std::{fmt::Display, num::NonZero};

use crate::{Indicator, IndicatorConfig, IndicatorConfigBuilder, MovingAverage, Price, Result};

const DEFAULT_MOMENTUM: NonZero<usize> = NonZero::new(1).unwrap();
const DEFAULT_SLOW: NonZero<usize> = NonZero::new(25).unwrap();
const DEFAULT_FAST: NonZero<usize> = NonZero::new(13).unwrap();
const DEFAULT_SIGNAL: NonZero<usize> = NonZero::new(7).unwrap();

/// Configuration for the True Strength Index ([`Tsi`]).
///
/// ```
/// use recursive_ta::{IndicatorConfig, IndicatorConfigBuilder, MovingAverage, TsiConfig};
/// use std::num::NonZero;
///
/// let config = TsiConfig::builder()
///     .smoothing(MovingAverage::Sma)
///     .build()
///     .unwrap();
/// assert_eq!(config.to_string(), "TsiConfig(1, 25, 13, 7, sma)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TsiConfig {
    momentum: NonZero<usize>,
    slow: NonZero<usize>,
    fast: NonZero<usize>,
    signal: NonZero<usize>,
    smoothing: MovingAverage,
}

impl IndicatorConfig for TsiConfig {
    type Builder = TsiConfigBuilder;

    fn builder() -> Self::Builder {
        TsiConfigBuilder {
            config: Self::default(),
        }
    }
}

impl TsiConfig {
    /// Momentum lookback in bars.
    #[inline]
    #[must_use]
    pub fn momentum(&self) -> usize {
        self.momentum.get()
    }

    /// First smoothing pass.
    #[inline]
    #[must_use]
    pub fn slow(&self) -> usize {
        self.slow.get()
    }

    /// Second smoothing pass.
    #[inline]
    #[must_use]
    pub fn fast(&self) -> usize {
        self.fast.get()
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

impl Default for TsiConfig {
    /// Momentum 1, slow 25, fast 13, signal 7, EMA.
    fn default() -> Self {
        Self {
            momentum: DEFAULT_MOMENTUM,
            slow: DEFAULT_SLOW,
            fast: DEFAULT_FAST,
            signal: DEFAULT_SIGNAL,
            smoothing: MovingAverage::EMA,
        }
    }
}

impl Display for TsiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TsiConfig({}, {}, {}, {}, {})",
            self.momentum, self.slow, self.fast, self.signal, self.smoothing
        )
    }
}

/// Builder for [`TsiConfig`]. Every field has a default.
pub struct TsiConfigBuilder {
    config: TsiConfig,
}

impl TsiConfigBuilder {
    #[must_use]
    pub fn momentum(mut self, momentum: NonZero<usize>) -> Self {
        self.config.momentum = momentum;
        self
    }

    #[must_use]
    pub fn slow(mut self, slow: NonZero<usize>) -> Self {
        self.config.slow = slow;
        self
    }

    #[must_use]
    pub fn fast(mut self, fast: NonZero<usize>) -> Self {
        self.config.fast = fast;
        self
    }

    #[must_use]
    pub fn signal(mut self, signal: NonZero<usize>) -> Self {
        self.config.signal = signal;
        self
    }

    #[must_use]
    pub fn smoothing(mut self, smoothing: MovingAverage) -> Self {
        self.config.smoothing = smoothing;
        self
    }
}

impl IndicatorConfigBuilder<TsiConfig> for TsiConfigBuilder {
    fn build(self) -> Result<TsiConfig> {
        Ok(self.config)
    }
}

/// TSI line and its signal line, index-aligned with the input.
#[derive(Clone, Debug, PartialEq)]
pub struct TsiSeries {
    tsi: Vec<Price>,
    signal: Vec<Price>,
}

impl TsiSeries {
    /// Double-smoothed momentum over double-smoothed absolute momentum,
    /// scaled to ±100.
    #[must_use]
    pub fn tsi(&self) -> &[Price] {
        &self.tsi
    }

    #[must_use]
    pub fn signal(&self) -> &[Price] {
        &self.signal
    }
}

/// True Strength Index (TSI).
///
/// ```text
/// mom[i] = x[i] − x[i − m]
/// TSI    = 100 · MA(MA(mom, slow), fast) / MA(MA(|mom|, slow), fast)
/// signal = MA(TSI, signal)
/// ```
///
/// The first `m` bars have no momentum and are `NaN`, as is any bar where
/// the smoothed absolute momentum is zero.
///
/// ```
/// use recursive_ta::{Tsi, TsiConfig};
///
/// let input: Vec<f64> = (0..50).map(f64::from).collect();
/// let out = Tsi::new(TsiConfig::default()).apply(&input).unwrap();
///
/// assert!(out.tsi()[0].is_nan());
/// assert!((out.tsi()[49] - 100.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug)]
pub struct Tsi {
    config: TsiConfig,
}

impl Tsi {
    fn double_smooth(&self, series: &[Price]) -> Result<Vec<Price>> {
        let ma = self.config.smoothing;
        let once = ma.smooth(series, self.config.slow)?;
        ma.smooth(&once, self.config.fast)
    }
}

impl Indicator for Tsi {
    type Config = TsiConfig;
    type Input<'a> = &'a [Price];
    type Output = TsiSeries;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: &[Price]) -> Result<TsiSeries> {
        let m = self.config.momentum.get();
        let momentum: Vec<Price> = (0..input.len())
            .map(|i| i.checked_sub(m).map_or(f64::NAN, |p| input[i] - input[p]))
            .collect();
        let magnitude: Vec<Price> = momentum.iter().map(|v| v.abs()).collect();

        let numerator = self.double_smooth(&momentum)?;
        let denominator = self.double_smooth(&magnitude)?;

        let tsi: Vec<Price> = numerator
            .iter()
            .zip(&denominator)
            .map(|(n, d)| 100.0 * n / d)
            .collect();
        let signal = self.config.smoothing.smooth(&tsi, self.config.signal)?;

        Ok(TsiSeries { tsi, signal })
    }
}

impl Display for Tsi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TSI({}, {}, {})",
            self.config.slow, self.config.fast, self.config.signal
        )
    }
}
