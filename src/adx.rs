use std::{fmt::Display, num::NonZero};

use crate::{
    Hlc, Indicator, IndicatorConfig, IndicatorConfigBuilder, MovingAverage, Price, Result, atr,
    error,
};

/// Per-bar directional movement `(+DM, −DM)`.
///
/// Only the larger of the upward and downward moves counts, and only when
/// positive. Bar 0 has no previous bar and is `NaN` on both sides.
fn directional_movement(hlc: Hlc<'_>) -> (Vec<Price>, Vec<Price>) {
    let (high, low) = (hlc.high(), hlc.low());

    (0..hlc.len())
        .map(|i| match i.checked_sub(1) {
            None => (f64::NAN, f64::NAN),
            Some(p) => {
                let up = high[i] - high[p];
                let down = low[p] - low[i];
                (
                    if up > down && up > 0.0 { up } else { 0.0 },
                    if down > up && down > 0.0 { down } else { 0.0 },
                )
            }
        })
        .unzip()
}

/// `100 × DM / ATR`; zero when the range is zero.
#[inline]
fn directional_index(movement: Price, atr: Price) -> Price {
    if atr == 0.0 {
        0.0
    } else {
        100.0 * movement / atr
    }
}

/// `100 × |DI+ − DI−| / (DI+ + DI−)`; zero when neither side moved.
#[inline]
fn directional_movement_index(plus: Price, minus: Price) -> Price {
    let total = plus + minus;
    if total == 0.0 {
        0.0
    } else {
        100.0 * (plus - minus).abs() / total
    }
}

/// Configuration for the Average Directional Index ([`Adx`]).
///
/// ```
/// use recursive_ta::{AdxConfig, IndicatorConfig, IndicatorConfigBuilder, MovingAverage};
/// use std::num::NonZero;
///
/// let config = AdxConfig::builder()
///     .length(NonZero::new(14).unwrap())
///     .smoothing(MovingAverage::WILDERS)
///     .build()
///     .unwrap();
/// assert_eq!(config.to_string(), "AdxConfig(14, wilders)");
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdxConfig {
    length: NonZero<usize>,
    smoothing: MovingAverage,
}

impl IndicatorConfig for AdxConfig {
    type Builder = AdxConfigBuilder;

    fn builder() -> Self::Builder {
        AdxConfigBuilder {
            length: None,
            smoothing: MovingAverage::default(),
        }
    }
}

impl AdxConfig {
    /// ADX with SMA smoothing throughout.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self {
            length,
            smoothing: MovingAverage::default(),
        }
    }

    /// Window of the ATR, both directional movements and the final average.
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

impl Display for AdxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdxConfig({}, {})", self.length, self.smoothing)
    }
}

/// Builder for [`AdxConfig`].
///
/// Defaults: smoothing = [`MovingAverage::Sma`]. Length is required.
pub struct AdxConfigBuilder {
    length: Option<NonZero<usize>>,
    smoothing: MovingAverage,
}

impl AdxConfigBuilder {
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

impl IndicatorConfigBuilder<AdxConfig> for AdxConfigBuilder {
    fn build(self) -> Result<AdxConfig> {
        Ok(AdxConfig {
            length: error::required("length", self.length)?,
            smoothing: self.smoothing,
        })
    }
}

/// ADX line with the two directional indicators it is built from.
#[derive(Clone, Debug, PartialEq)]
pub struct AdxSeries {
    adx: Vec<Price>,
    di_plus: Vec<Price>,
    di_minus: Vec<Price>,
}

impl AdxSeries {
    /// Smoothed DX, in `[0, 100]`.
    #[must_use]
    pub fn adx(&self) -> &[Price] {
        &self.adx
    }

    /// `100 × MA(+DM) / ATR`.
    #[must_use]
    pub fn di_plus(&self) -> &[Price] {
        &self.di_plus
    }

    /// `100 × MA(−DM) / ATR`.
    #[must_use]
    pub fn di_minus(&self) -> &[Price] {
        &self.di_minus
    }
}

/// Average Directional Index (ADX).
///
/// Trend strength regardless of direction:
///
/// ```text
/// +DM = high − high[i−1]  if it beats low[i−1] − low and is positive, else 0
/// −DM = low[i−1] − low    if it beats high − high[i−1] and is positive, else 0
/// DI± = 100 × MA(±DM) / ATR
/// DX  = 100 × |DI+ − DI−| / (DI+ + DI−)
/// ADX = MA(DX)
/// ```
///
/// One smoother and one window serve the ATR, both movements and the final
/// average. A zero ATR gives zero DIs, and a bar where neither DI moved has
/// a DX of zero. With SMA smoothing the DIs start at index `length` and the
/// ADX at `2 × length − 1`.
///
/// # Example
///
/// ```
/// use recursive_ta::{Adx, AdxConfig, Hlc};
/// use std::num::NonZero;
///
/// let high = [10.0, 11.0, 12.0, 13.0];
/// let low = [9.0, 10.0, 11.0, 12.0];
/// let close = [9.5, 10.5, 11.5, 12.5];
/// let hlc = Hlc::new(&high, &low, &close).unwrap();
///
/// let out = Adx::new(AdxConfig::new(NonZero::new(2).unwrap()))
///     .apply(hlc)
///     .unwrap();
///
/// // Steady climb: all movement is upward.
/// assert_eq!(out.di_minus()[3], 0.0);
/// assert_eq!(out.adx()[3], 100.0);
/// ```
#[derive(Clone, Debug)]
pub struct Adx {
    config: AdxConfig,
}

impl Indicator for Adx {
    type Config = AdxConfig;
    type Input<'a> = Hlc<'a>;
    type Output = AdxSeries;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: Hlc<'_>) -> Result<AdxSeries> {
        let (ma, n) = (self.config.smoothing, self.config.length);
        let atr = ma.smooth(&atr::true_range(input), n)?;
        let (plus_dm, minus_dm) = directional_movement(input);

        let di = |movement: &[Price]| -> Result<Vec<Price>> {
            Ok(ma
                .smooth(movement, n)?
                .iter()
                .zip(&atr)
                .map(|(&dm, &a)| directional_index(dm, a))
                .collect())
        };
        let di_plus = di(&plus_dm)?;
        let di_minus = di(&minus_dm)?;

        let dx: Vec<Price> = di_plus
            .iter()
            .zip(&di_minus)
            .map(|(&p, &m)| directional_movement_index(p, m))
            .collect();

        Ok(AdxSeries {
            adx: ma.smooth(&dx, n)?,
            di_plus,
            di_minus,
        })
    }
}

impl Display for Adx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ADX({})", self.config.length)
    }
}
