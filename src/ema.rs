use std::{
    fmt::{Debug, Display},
    num::NonZero,
};

use crate::{
    Indicator, IndicatorConfig, IndicatorConfigBuilder, Price, Result, error, warm_up,
};

/// How a recursive smoother picks its first defined output.
///
/// Published EMA formulas disagree on seeding, so the choice is explicit.
/// Both variants seed at the first defined input, skipping any `NaN` prefix
/// left by an upstream indicator.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EmaSeed {
    /// The first defined input is the first output. No warm-up prefix.
    #[default]
    First,
    /// The mean of the first `length` defined inputs is the first output,
    /// emitted at the last of those bars. Earlier positions are `NaN`.
    Sma,
}

impl EmaSeed {
    /// Seed position and value, or `None` if `values` is too short.
    fn locate(self, values: &[Price], length: usize) -> Option<(usize, Price)> {
        match self {
            Self::First => {
                warm_up::first_defined(values).map(|start| (start, values[start]))
            }
            Self::Sma => warm_up::window_start(values, length).map(|end| {
                let window = &values[end + 1 - length..=end];
                #[allow(clippy::cast_precision_loss)]
                let mean = window.iter().sum::<Price>() / length as f64;
                (end, mean)
            }),
        }
    }
}

impl Display for EmaSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Sma => f.write_str("sma"),
        }
    }
}

/// Folds `output = α·input + (1 − α)·previous` forward from the seed.
///
/// `NaN` after the seed propagates to every later output.
pub(crate) fn exponential(values: &[Price], alpha: f64, length: usize, seed: EmaSeed) -> Vec<Price> {
    let mut out = warm_up::undefined(values.len());

    let Some((start, seed_value)) = seed.locate(values, length) else {
        return out;
    };

    let retain = 1.0 - alpha;
    out[start] = seed_value;

    let mut previous = seed_value;
    for (slot, &price) in out[start + 1..].iter_mut().zip(&values[start + 1..]) {
        previous = alpha.mul_add(price, retain * previous);
        *slot = previous;
    }

    out
}

/// Configuration for the Exponential Moving Average ([`Ema`]).
///
/// # Example
///
/// ```
/// use recursive_ta::{EmaConfig, EmaSeed, IndicatorConfig, IndicatorConfigBuilder};
/// use std::num::NonZero;
///
/// let config = EmaConfig::builder()
///     .length(NonZero::new(20).unwrap())
///     .seed(EmaSeed::Sma)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.length(), 20);
/// assert_eq!(config.seed(), EmaSeed::Sma);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmaConfig {
    length: NonZero<usize>,
    seed: EmaSeed,
}

impl IndicatorConfig for EmaConfig {
    type Builder = EmaConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        EmaConfigBuilder::new()
    }
}

impl EmaConfig {
    /// EMA with the default seed.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self {
            length,
            seed: EmaSeed::default(),
        }
    }

    /// Window length (number of bars).
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

    /// Smoothing factor `α = 2 / (length + 1)`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn alpha(&self) -> f64 {
        2.0 / (self.length.get() as f64 + 1.0)
    }
}

impl Display for EmaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmaConfig({}, {})", self.length, self.seed)
    }
}

/// Builder for [`EmaConfig`].
///
/// Defaults: seed = [`EmaSeed::First`].
/// Length must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct EmaConfigBuilder {
    length: Option<NonZero<usize>>,
    seed: EmaSeed,
}

impl EmaConfigBuilder {
    fn new() -> Self {
        Self {
            length: None,
            seed: EmaSeed::default(),
        }
    }

    /// Sets the window length.
    #[inline]
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length);
        self
    }

    /// Sets the seeding rule.
    #[inline]
    #[must_use]
    pub fn seed(mut self, seed: EmaSeed) -> Self {
        self.seed = seed;
        self
    }
}

impl IndicatorConfigBuilder<EmaConfig> for EmaConfigBuilder {
    #[inline]
    fn build(self) -> Result<EmaConfig> {
        Ok(EmaConfig {
            length: error::required("length", self.length)?,
            seed: self.seed,
        })
    }
}

/// Exponential Moving Average (EMA).
///
/// A recursive average giving more weight to recent values, with smoothing
/// factor `α = 2 / (length + 1)`:
///
/// ```text
/// EMA[i] = α × x[i] + (1 − α) × EMA[i − 1]
/// ```
///
/// With the default [`EmaSeed::First`] the first defined input is copied to
/// the output, so a length-1 EMA reproduces its input exactly and a
/// constant input has no warm-up artifact.
///
/// # Example
///
/// ```
/// use recursive_ta::{Ema, EmaConfig};
/// use std::num::NonZero;
///
/// let ema = Ema::new(EmaConfig::new(NonZero::new(3).unwrap()));
///
/// // α = 0.5
/// let out = ema.apply(&[2.0, 4.0, 8.0]).unwrap();
/// assert_eq!(out, vec![2.0, 3.0, 5.5]);
/// ```
#[derive(Clone, Debug)]
pub struct Ema {
    config: EmaConfig,
    alpha: f64,
}

impl Indicator for Ema {
    type Config = EmaConfig;
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
        Ok(exponential(
            input,
            self.alpha,
            self.config.length(),
            self.config.seed,
        ))
    }
}

impl Display for Ema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EMA({})", self.config.length)
    }
}
