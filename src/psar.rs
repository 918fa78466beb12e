use std::{fmt::Display, iter::FusedIterator};

use tracing::trace;

use crate::{
    Error, Hlc, Indicator, IndicatorConfig, IndicatorConfigBuilder, Multiplier, Price, Result,
};

const DEFAULT_STEP: Multiplier = Multiplier::constant(0.02);
const DEFAULT_MAX: Multiplier = Multiplier::constant(0.2);

/// Direction of travel of a [`Psar`].
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum PsarTrend {
    /// SAR trails below price; extreme point is the highest high.
    Rising,
    /// SAR trails above price; extreme point is the lowest low.
    Falling,
}

/// Carried state of the PSAR recursion after one bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PsarState {
    trend: PsarTrend,
    sar: Price,
    extreme_point: Price,
    acceleration: f64,
}

impl PsarState {
    /// Bar 0: trend from the first close-to-close move, SAR at the
    /// opposite extreme of bar 0.
    fn seed(hlc: Hlc<'_>, step: f64) -> Self {
        let (high, low, close) = (hlc.high(), hlc.low(), hlc.close());
        let rising = close.get(1).is_none_or(|&next| next >= close[0]);

        if rising {
            Self {
                trend: PsarTrend::Rising,
                sar: low[0],
                extreme_point: high[0],
                acceleration: step,
            }
        } else {
            Self {
                trend: PsarTrend::Falling,
                sar: high[0],
                extreme_point: low[0],
                acceleration: step,
            }
        }
    }

    /// State after bar `i`, given the state after bar `i − 1`.
    fn advance(self, hlc: Hlc<'_>, i: usize, step: f64, max: f64) -> Self {
        let (high, low) = (hlc.high(), hlc.low());
        let mut candidate = self
            .acceleration
            .mul_add(self.extreme_point - self.sar, self.sar);

        match self.trend {
            PsarTrend::Rising => {
                for &bound in &low[i.saturating_sub(2)..i] {
                    if candidate > bound {
                        candidate = bound;
                    }
                }

                if low[i] < candidate {
                    return self.reverse(i, PsarTrend::Falling, low[i], step);
                }

                self.proceed(candidate, high[i] > self.extreme_point, high[i], step, max)
            }
            PsarTrend::Falling => {
                for &bound in &high[i.saturating_sub(2)..i] {
                    if candidate < bound {
                        candidate = bound;
                    }
                }

                if high[i] > candidate {
                    return self.reverse(i, PsarTrend::Rising, high[i], step);
                }

                self.proceed(candidate, low[i] < self.extreme_point, low[i], step, max)
            }
        }
    }

    fn reverse(self, i: usize, trend: PsarTrend, extreme_point: Price, step: f64) -> Self {
        let sar = self.extreme_point;
        trace!(bar = i, ?trend, sar, "psar reversal");

        Self {
            trend,
            sar,
            extreme_point,
            acceleration: step,
        }
    }

    fn proceed(self, sar: Price, advanced: bool, price: Price, step: f64, max: f64) -> Self {
        if advanced {
            Self {
                sar,
                extreme_point: price,
                acceleration: (self.acceleration + step).min(max),
                ..self
            }
        } else {
            Self { sar, ..self }
        }
    }

    #[inline]
    #[must_use]
    pub fn trend(&self) -> PsarTrend {
        self.trend
    }

    /// Stop-and-reverse level for this bar.
    #[inline]
    #[must_use]
    pub fn sar(&self) -> Price {
        self.sar
    }

    /// Most favourable price since the last reversal.
    #[inline]
    #[must_use]
    pub fn extreme_point(&self) -> Price {
        self.extreme_point
    }

    /// Current acceleration factor.
    #[inline]
    #[must_use]
    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }
}

/// Per-bar [`PsarState`]s, one for each bar of the input.
///
/// Created by [`Psar::states`].
#[derive(Clone, Debug)]
pub struct PsarStates<'a> {
    hlc: Hlc<'a>,
    step: f64,
    max: f64,
    index: usize,
    state: Option<PsarState>,
}

impl Iterator for PsarStates<'_> {
    type Item = PsarState;

    fn next(&mut self) -> Option<PsarState> {
        if self.index >= self.hlc.len() {
            return None;
        }

        let next = match self.state {
            None => PsarState::seed(self.hlc, self.step),
            Some(state) => state.advance(self.hlc, self.index, self.step, self.max),
        };

        self.state = Some(next);
        self.index += 1;
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.hlc.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PsarStates<'_> {}

impl FusedIterator for PsarStates<'_> {}

/// Configuration for the Parabolic SAR ([`Psar`]).
///
/// ```
/// use recursive_ta::{IndicatorConfig, IndicatorConfigBuilder, PsarConfig};
///
/// let config = PsarConfig::builder().step(0.01).build().unwrap();
/// assert_eq!(config.to_string(), "PsarConfig(0.01, 0.2)");
///
/// assert!(PsarConfig::builder().step(0.3).build().is_err());
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PsarConfig {
    step: Multiplier,
    max: Multiplier,
}

impl IndicatorConfig for PsarConfig {
    type Builder = PsarConfigBuilder;

    fn builder() -> Self::Builder {
        PsarConfigBuilder {
            step: DEFAULT_STEP.value(),
            max: DEFAULT_MAX.value(),
        }
    }
}

impl PsarConfig {
    /// Acceleration-factor increment, also its initial value.
    #[inline]
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step.value()
    }

    /// Acceleration-factor cap.
    #[inline]
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max.value()
    }
}

impl Default for PsarConfig {
    /// Step 0.02, cap 0.2.
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            max: DEFAULT_MAX,
        }
    }
}

impl Display for PsarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PsarConfig({}, {})", self.step, self.max)
    }
}

/// Builder for [`PsarConfig`].
///
/// Defaults: step = 0.02, max = 0.2. Requires `0 < step < max`.
pub struct PsarConfigBuilder {
    step: f64,
    max: f64,
}

impl PsarConfigBuilder {
    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }
}

impl IndicatorConfigBuilder<PsarConfig> for PsarConfigBuilder {
    fn build(self) -> Result<PsarConfig> {
        let step = Multiplier::named("step", self.step)?;
        let max = Multiplier::named("max", self.max)?;

        if max <= step {
            return Err(Error::invalid(
                "max",
                format!("must exceed step ({step}), got {max}"),
            ));
        }

        Ok(PsarConfig { step, max })
    }
}

/// Parabolic Stop-and-Reverse.
///
/// A trailing stop that accelerates toward price while a trend makes new
/// extremes, and jumps to the other side of price when it is penetrated.
/// Every bar has a value: there is no warm-up prefix.
///
/// Undefined prices never fail. A `NaN` on bar 0 leaves the seed undefined,
/// so every SAR is `NaN` and the trend never reverses. A `NaN` on a later
/// bar compares false everywhere: that bar neither reverses the trend nor
/// extends the extreme point, and the SAR keeps advancing.
///
/// ```
/// use recursive_ta::{Hlc, Psar, PsarConfig, PsarTrend};
///
/// let high = [10.0, 11.0, 12.0, 8.0];
/// let low = [9.0, 10.0, 11.0, 5.0];
/// let close = [9.5, 10.5, 11.5, 6.0];
/// let hlc = Hlc::new(&high, &low, &close).unwrap();
///
/// let psar = Psar::new(PsarConfig::default());
/// let sar = psar.apply(hlc).unwrap();
/// assert_eq!(&sar[..3], &[9.0, 9.0, 9.0]);
/// // Bar 3 pierces the stop: SAR jumps to the prior highest high.
/// assert_eq!(sar[3], 12.0);
///
/// let last = psar.states(hlc).last().unwrap();
/// assert_eq!(last.trend(), PsarTrend::Falling);
/// assert_eq!(last.acceleration(), 0.02);
/// ```
#[derive(Clone, Debug)]
pub struct Psar {
    config: PsarConfig,
}

impl Psar {
    /// Runs the recursion over `hlc`, yielding the state after every bar.
    #[must_use]
    pub fn states<'a>(&self, hlc: Hlc<'a>) -> PsarStates<'a> {
        PsarStates {
            hlc,
            step: self.config.step(),
            max: self.config.max(),
            index: 0,
            state: None,
        }
    }
}

impl Indicator for Psar {
    type Config = PsarConfig;
    type Input<'a> = Hlc<'a>;
    type Output = Vec<Price>;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: Hlc<'_>) -> Result<Vec<Price>> {
        Ok(self.states(input).map(|state| state.sar).collect())
    }
}

impl Display for Psar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PSAR({}, {})", self.config.step, self.config.max)
    }
}
