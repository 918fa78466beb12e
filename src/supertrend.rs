use std::{fmt::Display, iter::FusedIterator, num::NonZero};

use tracing::trace;

use crate::{
    Atr, AtrConfig, Hlc, Indicator, IndicatorConfig, IndicatorConfigBuilder, MovingAverage,
    Multiplier, Price, Result, error,
};

const DEFAULT_FACTOR: Multiplier = Multiplier::constant(2.0);

/// Regime of a [`Supertrend`].
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum SupertrendTrend {
    /// Price above the line; the line is the final lower band.
    Up,
    /// Price below the line; the line is the final upper band.
    Down,
}

/// Carried state of the Supertrend recursion after one active bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupertrendState {
    trend: SupertrendTrend,
    upper: Price,
    lower: Price,
}

impl SupertrendState {
    /// First active bar: final bands start at the basic bands, from a
    /// `Down` regime.
    fn activate(i: usize, upper: Price, lower: Price, close: Price) -> Self {
        Self {
            trend: SupertrendTrend::Down,
            upper,
            lower,
        }
        .settle(i, close)
    }

    /// Ratchets the final bands, then re-evaluates the trend.
    fn advance(self, i: usize, basic: (Price, Price), prev_close: Price, close: Price) -> Self {
        let (basic_upper, basic_lower) = basic;

        let upper = if basic_upper < self.upper || prev_close > self.upper {
            basic_upper
        } else {
            self.upper
        };
        let lower = if basic_lower > self.lower || prev_close < self.lower {
            basic_lower
        } else {
            self.lower
        };

        Self {
            upper,
            lower,
            ..self
        }
        .settle(i, close)
    }

    fn settle(self, i: usize, close: Price) -> Self {
        let trend = match self.trend {
            SupertrendTrend::Down if close > self.upper => SupertrendTrend::Up,
            SupertrendTrend::Up if close < self.lower => SupertrendTrend::Down,
            unchanged => unchanged,
        };

        let next = Self { trend, ..self };
        if trend != self.trend {
            trace!(bar = i, ?trend, value = next.value(), "supertrend flip");
        }
        next
    }

    #[inline]
    #[must_use]
    pub fn trend(&self) -> SupertrendTrend {
        self.trend
    }

    /// Final upper band.
    #[inline]
    #[must_use]
    pub fn upper(&self) -> Price {
        self.upper
    }

    /// Final lower band.
    #[inline]
    #[must_use]
    pub fn lower(&self) -> Price {
        self.lower
    }

    /// The active line: upper band while `Down`, lower band while `Up`.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Price {
        match self.trend {
            SupertrendTrend::Up => self.lower,
            SupertrendTrend::Down => self.upper,
        }
    }
}

/// Per-bar Supertrend states: `None` before activation, then `Some`.
///
/// Created by [`Supertrend::states`].
#[derive(Clone, Debug)]
pub struct SupertrendStates<'a> {
    hlc: Hlc<'a>,
    atr: &'a [Price],
    factor: f64,
    start: usize,
    index: usize,
    state: Option<SupertrendState>,
}

impl SupertrendStates<'_> {
    fn basic_bands(&self, i: usize) -> (Price, Price) {
        let mid = self.hlc.midpoint(i);
        let offset = self.factor * self.atr[i];
        (mid + offset, mid - offset)
    }
}

impl Iterator for SupertrendStates<'_> {
    type Item = Option<SupertrendState>;

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.index;
        if i >= self.hlc.len() {
            return None;
        }
        self.index += 1;

        if i < self.start {
            return Some(None);
        }

        let close = self.hlc.close();
        let basic = self.basic_bands(i);
        let next = match self.state {
            None => SupertrendState::activate(i, basic.0, basic.1, close[i]),
            Some(state) => state.advance(i, basic, close[i - 1], close[i]),
        };

        self.state = Some(next);
        Some(Some(next))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.hlc.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SupertrendStates<'_> {}

impl FusedIterator for SupertrendStates<'_> {}

/// Configuration for the [`Supertrend`] indicator.
///
/// ```
/// use recursive_ta::{IndicatorConfig, IndicatorConfigBuilder, MovingAverage, SupertrendConfig};
/// use std::num::NonZero;
///
/// let config = SupertrendConfig::builder()
///     .length(NonZero::new(10).unwrap())
///     .factor(3.0)
///     .smoothing(MovingAverage::WILDERS)
///     .build()
///     .unwrap();
/// assert_eq!(config.to_string(), "SupertrendConfig(10, 3, wilders)");
///
/// let err = SupertrendConfig::builder()
///     .length(NonZero::new(10).unwrap())
///     .factor(0.0)
///     .build();
/// assert!(err.is_err());
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SupertrendConfig {
    length: NonZero<usize>,
    factor: Multiplier,
    smoothing: MovingAverage,
}

impl IndicatorConfig for SupertrendConfig {
    type Builder = SupertrendConfigBuilder;

    fn builder() -> Self::Builder {
        SupertrendConfigBuilder {
            length: None,
            factor: DEFAULT_FACTOR.value(),
            smoothing: MovingAverage::default(),
        }
    }
}

impl SupertrendConfig {
    /// Supertrend with factor 2 over an SMA-smoothed ATR.
    #[must_use]
    pub fn new(length: NonZero<usize>) -> Self {
        Self {
            length,
            factor: DEFAULT_FACTOR,
            smoothing: MovingAverage::default(),
        }
    }

    /// ATR window and activation bar.
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.length.get()
    }

    /// ATR multiple added to and subtracted from the bar midpoint.
    #[inline]
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor.value()
    }

    #[inline]
    #[must_use]
    pub fn smoothing(&self) -> MovingAverage {
        self.smoothing
    }
}

impl Display for SupertrendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SupertrendConfig({}, {}, {})",
            self.length, self.factor, self.smoothing
        )
    }
}

/// Builder for [`SupertrendConfig`].
///
/// Defaults: factor = 2, smoothing = [`MovingAverage::Sma`]. Length is
/// required.
pub struct SupertrendConfigBuilder {
    length: Option<NonZero<usize>>,
    factor: f64,
    smoothing: MovingAverage,
}

impl SupertrendConfigBuilder {
    #[must_use]
    pub fn length(mut self, length: NonZero<usize>) -> Self {
        self.length.replace(length);
        self
    }

    #[must_use]
    pub fn factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Smoothing applied to the true range by [`Supertrend::apply`].
    #[must_use]
    pub fn smoothing(mut self, smoothing: MovingAverage) -> Self {
        self.smoothing = smoothing;
        self
    }
}

impl IndicatorConfigBuilder<SupertrendConfig> for SupertrendConfigBuilder {
    fn build(self) -> Result<SupertrendConfig> {
        Ok(SupertrendConfig {
            length: error::required("length", self.length)?,
            factor: Multiplier::named("factor", self.factor)?,
            smoothing: self.smoothing,
        })
    }
}

/// Supertrend: an ATR band around the bar midpoint that only tightens
/// while a trend holds, and switches sides when price closes through it.
///
/// Bars before index `length` are `NaN`. The first active bar is the first
/// bar from `length` on where both ATR and close are defined; it starts
/// from a `Down` regime.
///
/// [`apply`](Supertrend::apply) computes the ATR itself;
/// [`with_atr`](Supertrend::with_atr) takes a precomputed one.
///
/// ```
/// use recursive_ta::{Hlc, Supertrend, SupertrendConfig};
/// use std::num::NonZero;
///
/// let high = [10.5; 6];
/// let low = [9.5; 6];
/// let close = [10.0, 10.0, 7.0, 7.0, 13.0, 13.0];
/// let atr = [1.0; 6];
/// let hlc = Hlc::new(&high, &low, &close).unwrap();
///
/// let st = Supertrend::new(SupertrendConfig::new(NonZero::new(2).unwrap()));
/// let line = st.with_atr(hlc, &atr).unwrap();
///
/// assert!(line[0].is_nan() && line[1].is_nan());
/// // Down on the upper band until the close breaks above it.
/// assert_eq!(&line[2..], &[12.0, 12.0, 8.0, 8.0]);
/// ```
#[derive(Clone, Debug)]
pub struct Supertrend {
    config: SupertrendConfig,
}

impl Supertrend {
    /// Runs the state machine against a precomputed ATR.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) if `atr` and
    /// the close column differ in length.
    pub fn states<'a>(&self, hlc: Hlc<'a>, atr: &'a [Price]) -> Result<SupertrendStates<'a>> {
        error::aligned("atr", hlc.len(), atr.len())?;

        let close = hlc.close();
        let start = (self.config.length()..hlc.len())
            .find(|&i| !atr[i].is_nan() && !close[i].is_nan())
            .unwrap_or(hlc.len());

        Ok(SupertrendStates {
            hlc,
            atr,
            factor: self.config.factor(),
            start,
            index: 0,
            state: None,
        })
    }

    /// Supertrend line over a caller-supplied ATR.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) if `atr` and
    /// the close column differ in length.
    pub fn with_atr(&self, hlc: Hlc<'_>, atr: &[Price]) -> Result<Vec<Price>> {
        Ok(self
            .states(hlc, atr)?
            .map(|state| state.map_or(f64::NAN, |s| s.value()))
            .collect())
    }
}

impl Indicator for Supertrend {
    type Config = SupertrendConfig;
    type Input<'a> = Hlc<'a>;
    type Output = Vec<Price>;

    fn new(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn apply(&self, input: Hlc<'_>) -> Result<Vec<Price>> {
        let atr = AtrConfig::builder()
            .length(self.config.length)
            .smoothing(self.config.smoothing)
            .build()
            .map(Atr::new)?
            .apply(input)?;

        self.with_atr(input, &atr)
    }
}

impl Display for Supertrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SUPERTREND({}, {})",
            self.config.length, self.config.factor
        )
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{
        Error,
        test_util::{Columns, assert_series, nan_prefix, nz},
    };

    const NAN: f64 = f64::NAN;

    fn supertrend(length: usize) -> Supertrend {
        Supertrend::new(SupertrendConfig::new(nz(length)))
    }

    /// Midpoint fixed at 10, so with ATR 1 and factor 2 the basic bands
    /// are 12 and 8 on every bar.
    fn pinned(close: &[f64]) -> Columns {
        Columns {
            high: vec![10.5; close.len()],
            low: vec![9.5; close.len()],
            close: close.to_vec(),
        }
    }

    mod activation {
        use super::*;

        #[test]
        fn undefined_before_length() {
            let c = pinned(&[10.0; 6]);
            let line = supertrend(3).with_atr(c.hlc(), &[1.0; 6]).unwrap();
            assert_eq!(nan_prefix(&line), 3);
        }

        #[test]
        fn starts_down_on_upper_band() {
            let c = pinned(&[10.0; 5]);
            let states: Vec<_> = supertrend(3)
                .states(c.hlc(), &[1.0; 5])
                .unwrap()
                .collect();
            assert!(states[..3].iter().all(Option::is_none));
            let first = states[3].unwrap();
            assert_eq!(first.trend(), SupertrendTrend::Down);
            assert_eq!((first.upper(), first.lower()), (12.0, 8.0));
            assert_eq!(first.value(), 12.0);
        }

        #[test]
        fn close_above_upper_activates_up() {
            let c = pinned(&[10.0, 10.0, 10.0, 15.0]);
            let line = supertrend(3).with_atr(c.hlc(), &[1.0; 4]).unwrap();
            assert_eq!(line[3], 8.0);
        }

        #[test]
        fn waits_for_defined_atr() {
            let c = pinned(&[10.0; 8]);
            let atr = [NAN, NAN, NAN, NAN, NAN, 1.0, 1.0, 1.0];
            let line = supertrend(3).with_atr(c.hlc(), &atr).unwrap();
            assert_series(&line, &[NAN, NAN, NAN, NAN, NAN, 12.0, 12.0, 12.0], 0.0);
        }

        #[test]
        fn short_input_is_all_nan() {
            let c = pinned(&[10.0; 3]);
            let line = supertrend(3).with_atr(c.hlc(), &[1.0; 3]).unwrap();
            assert_eq!(nan_prefix(&line), 3);
        }
    }

    mod trend {
        use super::*;

        #[test]
        fn flips_once_when_close_crosses_bands() {
            let c = pinned(&[10.0, 10.0, 10.0, 7.0, 7.0, 7.0, 13.0, 13.0]);
            let states: Vec<_> = supertrend(3)
                .states(c.hlc(), &[1.0; 8])
                .unwrap()
                .flatten()
                .collect();

            let trends: Vec<_> = states.iter().map(SupertrendState::trend).collect();
            assert_eq!(
                trends,
                [
                    SupertrendTrend::Down,
                    SupertrendTrend::Down,
                    SupertrendTrend::Down,
                    SupertrendTrend::Up,
                    SupertrendTrend::Up,
                ]
            );

            let line = supertrend(3).with_atr(c.hlc(), &[1.0; 8]).unwrap();
            assert_series(&line, &[NAN, NAN, NAN, 12.0, 12.0, 12.0, 8.0, 8.0], 0.0);
        }

        #[test]
        fn up_flips_down_below_lower_band() {
            let c = pinned(&[10.0, 10.0, 15.0, 11.0, 5.0]);
            let line = supertrend(2).with_atr(c.hlc(), &[1.0; 5]).unwrap();
            assert_series(&line, &[NAN, NAN, 8.0, 8.0, 12.0], 0.0);
        }

        #[test]
        fn close_on_band_does_not_flip() {
            let c = pinned(&[10.0, 10.0, 12.0, 12.0]);
            let line = supertrend(2).with_atr(c.hlc(), &[1.0; 4]).unwrap();
            assert_eq!(&line[2..], &[12.0, 12.0]);
        }

        #[test]
        fn constant_input_is_fixed_point() {
            let c = Columns::flat(25.0, 12);
            let line = supertrend(4).apply(c.hlc()).unwrap();
            assert_eq!(nan_prefix(&line), 4);
            assert!(line[4..].iter().all(|&v| v == 25.0));
        }
    }

    mod ratchet {
        use super::*;

        #[test]
        fn upper_band_only_tightens_while_down() {
            // Midpoint oscillates lower and higher; close stays well below.
            let mid = [20.0, 20.0, 19.0, 21.0, 18.0, 22.0, 17.0];
            let c = Columns {
                high: mid.iter().map(|m| m + 0.5).collect(),
                low: mid.iter().map(|m| m - 0.5).collect(),
                close: vec![10.0; mid.len()],
            };
            let uppers: Vec<_> = supertrend(1)
                .states(c.hlc(), &[1.0; 7])
                .unwrap()
                .flatten()
                .map(|s| s.upper())
                .collect();
            assert_eq!(uppers, [22.0, 21.0, 21.0, 20.0, 20.0, 19.0]);
        }

        #[test]
        fn lower_band_only_tightens_while_up() {
            let mid = [20.0, 20.0, 21.0, 19.0, 22.0, 18.0];
            let c = Columns {
                high: mid.iter().map(|m| m + 0.5).collect(),
                low: mid.iter().map(|m| m - 0.5).collect(),
                close: vec![30.0; mid.len()],
            };
            let states: Vec<_> = supertrend(1)
                .states(c.hlc(), &[1.0; 6])
                .unwrap()
                .flatten()
                .collect();
            assert!(states.iter().all(|s| s.trend() == SupertrendTrend::Up));
            let lowers: Vec<_> = states.iter().map(SupertrendState::lower).collect();
            assert_eq!(lowers, [18.0, 19.0, 19.0, 20.0, 20.0]);
        }

        #[test]
        fn upper_band_resets_after_close_above() {
            // Close 13 > final upper 12 at bar 3, so bar 4 takes the basic band.
            let c = Columns {
                high: vec![10.5, 10.5, 10.5, 10.5, 14.5],
                low: vec![9.5, 9.5, 9.5, 9.5, 13.5],
                close: vec![10.0, 10.0, 10.0, 13.0, 14.0],
            };
            let last = supertrend(2)
                .states(c.hlc(), &[1.0; 5])
                .unwrap()
                .last()
                .flatten()
                .unwrap();
            assert_eq!(last.upper(), 16.0);
            assert_eq!(last.lower(), 12.0);
        }
    }

    mod atr {
        use super::*;
        use crate::{Atr, AtrConfig};

        #[test]
        fn apply_matches_precomputed_atr() {
            let c = Columns::from_rows(&[
                (11.0, 9.0, 10.0),
                (12.0, 10.0, 11.5),
                (13.0, 10.5, 12.0),
                (12.5, 9.0, 9.5),
                (11.0, 8.0, 8.5),
                (10.0, 7.5, 9.5),
                (12.0, 9.0, 11.8),
            ]);
            let st = supertrend(3);
            let atr = Atr::new(AtrConfig::new(nz(3))).apply(c.hlc()).unwrap();
            let a = st.apply(c.hlc()).unwrap();
            let b = st.with_atr(c.hlc(), &atr).unwrap();
            assert_series(&a, &b, 0.0);
        }

        #[test]
        fn rejects_misaligned_atr() {
            let c = pinned(&[10.0; 5]);
            assert!(matches!(
                supertrend(3).with_atr(c.hlc(), &[1.0; 4]),
                Err(Error::ShapeMismatch {
                    name: "atr",
                    expected: 5,
                    actual: 4
                })
            ));
        }
    }

    mod config {
        use super::*;

        #[test]
        fn defaults() {
            let config = SupertrendConfig::builder().length(nz(20)).build().unwrap();
            assert_eq!(config, SupertrendConfig::new(nz(20)));
            assert_eq!(config.factor(), 2.0);
            assert_eq!(config.smoothing(), MovingAverage::Sma);
        }

        #[test]
        fn rejects_non_positive_factor() {
            for factor in [0.0, -1.5] {
                assert!(matches!(
                    SupertrendConfig::builder().length(nz(5)).factor(factor).build(),
                    Err(Error::InvalidParameter { name: "factor", .. })
                ));
            }
        }

        #[test]
        fn build_requires_length() {
            assert!(matches!(
                SupertrendConfig::builder().build(),
                Err(Error::InvalidParameter { name: "length", .. })
            ));
        }
    }

    mod display {
        use super::*;

        #[test]
        fn formats_correctly() {
            assert_eq!(supertrend(20).to_string(), "SUPERTREND(20, 2)");
            assert_eq!(
                SupertrendConfig::new(nz(20)).to_string(),
                "SupertrendConfig(20, 2, sma)"
            );
        }
    }
}
