use std::{fmt::Display, num::NonZero};

use crate::{
    EmaSeed, Indicator, IndicatorConfig, IndicatorConfigBuilder, Price, Result, ema, error,
};

/// Configuration for Wilder's moving average ([`Wilders`]).
///
/// ```
/// use recursive_ta::{IndicatorConfig, IndicatorConfigBuilder, WildersConfig};
/// use std::num::NonZero;
///
/// let config = WildersConfig::builder()
///     .length(NonZero::new(14).unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(config.length(), 14);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WildersConfig {
    length: NonZero<usize>,
    seed: EmaSeed,
}

impl IndicatorConfig for WildersConfig {
    type Builder = WildersConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        WildersConfigBuilder {
            length: None,
            seed: EmaSeed::default(),
        }
    }
}

impl WildersConfig {
    /// Wilder's average with the default seed.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self {
            length,
            seed: EmaSeed::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }

    #[inline]
    #[must_use]
    pub fn seed(&self) -> EmaSeed {
        self.seed
    }

    /// Smoothing factor `α = 1 / length`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn alpha(&self) -> f64 {
        1.0 / self.length.get() as f64
    }
}

impl Display for WildersConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WildersConfig({}, {})", self.length, self.seed)
    }
}

/// Builder for [`WildersConfig`].
///
/// Defaults: seed = [`EmaSeed::First`]. Length is required.
pub struct WildersConfigBuilder {
    length: Option<NonZero<usize>>,
    seed: EmaSeed,
}

impl WildersConfigBuilder {
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length);
        self
    }

    #[inline]
    #[must_use]
    pub fn seed(mut self, seed: EmaSeed) -> Self {
        self.seed = seed;
        self
    }
}

impl IndicatorConfigBuilder<WildersConfig> for WildersConfigBuilder {
    fn build(self) -> Result<WildersConfig> {
        Ok(WildersConfig {
            length: error::required("length", self.length)?,
            seed: self.seed,
        })
    }
}

/// Wilder's moving average.
///
/// The EMA recursion with the slower decay `α = 1 / length`, as used by
/// Wilder for RSI, ATR and ADX. Seeding follows [`EmaSeed`] exactly as for
/// [`Ema`](crate::Ema).
///
/// ```
/// use recursive_ta::{Wilders, WildersConfig};
/// use std::num::NonZero;
///
/// let wilders = Wilders::new(WildersConfig::new(NonZero::new(4).unwrap()));
///
/// // α = 0.25: 12 × 0.25 + 8 × 0.75 = 9
/// assert_eq!(wilders.apply(&[8.0, 12.0]).unwrap(), vec![8.0, 9.0]);
/// ```
#[derive(Clone, Debug)]
pub struct Wilders {
    config: WildersConfig,
    alpha: f64,
}

impl Indicator for Wilders {
    type Config = WildersConfig;
    type Input<'a> = &'a [Price];
    type Output = Vec<Price>;

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            alpha: config.alpha(),
        }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: &[Price]) -> Result<Vec<Price>> {
        Ok(ema::exponential(
            input,
            self.alpha,
            self.config.length(),
            self.config.seed,
        ))
    }
}

impl Display for Wilders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WILDERS({})", self.config.length)
    }
}
