use std::{fmt::Display, num::NonZero};

use crate::{
    Error, Indicator, IndicatorConfig, IndicatorConfigBuilder, Price, Result, efficiency_ratio,
    error, warm_up,
};

const DEFAULT_FAST: NonZero<usize> = NonZero::new(2).unwrap();
const DEFAULT_SLOW: NonZero<usize> = NonZero::new(30).unwrap();

/// Folds the adaptive recursion over `values`.
///
/// The smoothing constant moves between `slow_sc²` (pure noise) and
/// `fast_sc²` (clean trend) with the efficiency ratio:
///
/// ```text
/// SC[i]   = (ER[i] · (fast_sc − slow_sc) + slow_sc)²
/// KAMA[i] = KAMA[i − 1] + SC[i] · (x[i] − KAMA[i − 1])
/// ```
pub(crate) fn adaptive(
    values: &[Price],
    length: NonZero<usize>,
    fast: NonZero<usize>,
    slow: NonZero<usize>,
) -> Vec<Price> {
    let mut out = warm_up::undefined(values.len());
    let er = efficiency_ratio::ratio(values, length);

    let Some(start) = warm_up::first_defined(&er) else {
        return out;
    };

    let fast_sc = smoothing_constant(fast);
    let slow_sc = smoothing_constant(slow);
    let spread = fast_sc - slow_sc;

    let mut previous = values[start];
    out[start] = previous;

    for i in start + 1..values.len() {
        let sc = er[i].mul_add(spread, slow_sc).powi(2);
        previous = sc.mul_add(values[i] - previous, previous);
        out[i] = previous;
    }

    out
}

#[inline]
#[allow(clippy::cast_precision_loss)]
fn smoothing_constant(period: NonZero<usize>) -> f64 {
    2.0 / (period.get() as f64 + 1.0)
}

/// Configuration for Kaufman's Adaptive Moving Average ([`Kama`]).
///
/// ```
/// use recursive_ta::{IndicatorConfig, IndicatorConfigBuilder, KamaConfig};
/// use std::num::NonZero;
///
/// let config = KamaConfig::builder()
///     .length(NonZero::new(10).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!((config.length(), config.fast(), config.slow()), (10, 2, 30));
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KamaConfig {
    length: NonZero<usize>,
    fast: NonZero<usize>,
    slow: NonZero<usize>,
}

impl IndicatorConfig for KamaConfig {
    type Builder = KamaConfigBuilder;

    fn builder() -> Self::Builder {
        KamaConfigBuilder {
            length: None,
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
        }
    }
}

impl KamaConfig {
    /// KAMA with the standard fast (2) and slow (30) periods.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self {
            length,
            fast: DEFAULT_FAST,
            slow: DEFAULT_SLOW,
        }
    }

    /// Efficiency-ratio window.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }

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
}

impl Display for KamaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KamaConfig({}, {}, {})", self.length, self.fast, self.slow)
    }
}

/// Builder for [`KamaConfig`].
///
/// Defaults: fast = 2, slow = 30. Length is required; `fast < slow`.
pub struct KamaConfigBuilder {
    length: Option<NonZero<usize>>,
    fast: NonZero<usize>,
    slow: NonZero<usize>,
}

impl KamaConfigBuilder {
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length);
        self
    }

    /// Period of the fastest allowed smoothing constant.
    #[must_use]
    pub fn fast(mut self, fast: NonZero<usize>) -> Self {
        self.fast = fast;
        self
    }

    /// Period of the slowest allowed smoothing constant.
    #[must_use]
    pub fn slow(mut self, slow: NonZero<usize>) -> Self {
        self.slow = slow;
        self
    }
}

impl IndicatorConfigBuilder<KamaConfig> for KamaConfigBuilder {
    fn build(self) -> Result<KamaConfig> {
        let length = error::required("length", self.length)?;
        check_periods(self.fast, self.slow)?;

        Ok(KamaConfig {
            length,
            fast: self.fast,
            slow: self.slow,
        })
    }
}

pub(crate) fn check_periods(fast: NonZero<usize>, slow: NonZero<usize>) -> Result<()> {
    if fast < slow {
        Ok(())
    } else {
        Err(Error::invalid(
            "fast",
            format!("must be below slow ({slow}), got {fast}"),
        ))
    }
}

/// Kaufman's Adaptive Moving Average (KAMA).
///
/// Follows price closely while it trends and flattens out in sideways
/// noise, by scaling its smoothing constant with the
/// [efficiency ratio](crate::efficiency_ratio) of the last `length` bars.
///
/// The first `length` positions are `NaN`; at index `length` the output is
/// seeded with the input value there.
///
/// ```
/// use recursive_ta::{Kama, KamaConfig};
/// use std::num::NonZero;
///
/// let kama = Kama::new(KamaConfig::new(NonZero::new(2).unwrap()));
/// let out = kama.apply(&[1.0, 2.0, 3.0, 4.0]).unwrap();
///
/// assert!(out[0].is_nan() && out[1].is_nan());
/// assert_eq!(out[2], 3.0);
/// // ER = 1 ⇒ SC = (2/3)² = 4/9: 3 + 4/9 · (4 − 3)
/// assert!((out[3] - (3.0 + 4.0 / 9.0)).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct Kama {
    config: KamaConfig,
}

impl Indicator for Kama {
    type Config = KamaConfig;
    type Input<'a> = &'a [Price];
    type Output = Vec<Price>;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: &[Price]) -> Result<Vec<Price>> {
        Ok(adaptive(
            input,
            self.config.length,
            self.config.fast,
            self.config.slow,
        ))
    }
}

impl Display for Kama {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "KAMA({}, {}, {})",
            self.config.length, self.config.fast, self.config.slow
        )
    }
}
