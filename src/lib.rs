//! Recursive smoothers and trend-reversal state machines for technical
//! analysis.
//!
//! Indicators run over whole series in a single forward pass and return
//! output index-aligned with the input. Positions without enough history are
//! `NaN`, so indicators chain without special-casing their warm-up.
//!
//! The crate covers two families:
//!
//! - recursive smoothers ([`Ema`], [`Wilders`], [`Kama`]) and the windowed
//!   averages reachable through the [`MovingAverage`] selector;
//! - per-bar state machines ([`Psar`], [`Supertrend`]) whose carried state is
//!   exposed as plain values ([`PsarState`], [`SupertrendState`]).
//!
//! On top of them sit chained indicators that pick their smoother through
//! [`MovingAverage`]: [`Macd`], [`Trix`], [`Tsi`], [`Rsi`], [`Atr`],
//! [`Keltner`], [`Bb`] and [`Adx`].
//!
//! Each indicator type exposes [`new`](Ema::new), [`config`](Ema::config)
//! and [`apply`](Ema::apply) as inherent methods, so no trait import is
//! needed. Import [`Indicator`] only for generic code.
//!
//! ```
//! use recursive_ta::{Bar, Hlc, OhlcvSeries, Psar, PsarConfig, Rsi, RsiConfig};
//! use std::num::NonZero;
//!
//! let bars: Vec<Bar> = (0..30)
//!     .map(|i| {
//!         let mid = 100.0 + f64::from(i);
//!         Bar::new(mid, mid + 1.0, mid - 1.0, mid + 0.5)
//!     })
//!     .collect();
//! let series = OhlcvSeries::from_bars(&bars);
//!
//! let sar = Psar::new(PsarConfig::default()).apply(series.hlc()).unwrap();
//! assert!(sar.iter().zip(series.low()).all(|(s, l)| s <= l));
//!
//! let rsi = Rsi::new(RsiConfig::new(NonZero::new(14).unwrap()))
//!     .apply(series.close())
//!     .unwrap();
//! assert_eq!(rsi[29], 100.0);
//! ```

mod adx;
mod atr;
mod bb;
mod efficiency_ratio;
mod ema;
mod error;
mod indicator;
mod kama;
mod keltner;
mod macd;
mod moving_average;
mod multiplier;
mod ohlcv;
mod price_source;
mod psar;
mod ring_buffer;
mod rsi;
mod series;
mod sma;
mod supertrend;
mod trix;
mod tsi;
mod warm_up;
mod wilders;
mod wma;

pub use crate::error::{Error, Result};
pub use crate::indicator::{Indicator, IndicatorConfig, IndicatorConfigBuilder};
pub use crate::moving_average::MovingAverage;
pub use crate::multiplier::Multiplier;
pub use crate::ohlcv::{Bar, Ohlcv, Price};
pub use crate::price_source::PriceSource;
pub use crate::series::{Hlc, OhlcvSeries};

pub use crate::adx::{Adx, AdxConfig, AdxConfigBuilder, AdxSeries};
pub use crate::atr::{Atr, AtrConfig, AtrConfigBuilder, true_range};
pub use crate::bb::{Bb, BbConfig, BbConfigBuilder, BbSeries, Deviation};
pub use crate::efficiency_ratio::efficiency_ratio;
pub use crate::ema::{Ema, EmaConfig, EmaConfigBuilder, EmaSeed};
pub use crate::kama::{Kama, KamaConfig, KamaConfigBuilder};
pub use crate::keltner::{Keltner, KeltnerConfig, KeltnerConfigBuilder, KeltnerSeries};
pub use crate::macd::{Macd, MacdConfig, MacdConfigBuilder, MacdSeries};
pub use crate::psar::{Psar, PsarConfig, PsarConfigBuilder, PsarState, PsarStates, PsarTrend};
pub use crate::rsi::{Rsi, RsiConfig, RsiConfigBuilder};
pub use crate::sma::{Sma, SmaConfig, SmaConfigBuilder};
pub use crate::supertrend::{
    Supertrend, SupertrendConfig, SupertrendConfigBuilder, SupertrendState, SupertrendStates,
    SupertrendTrend,
};
pub use crate::trix::{Trix, TrixConfig, TrixConfigBuilder};
pub use crate::tsi::{Tsi, TsiConfig, TsiConfigBuilder, TsiSeries};
pub use crate::wilders::{Wilders, WildersConfig, WildersConfigBuilder};

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty, $input:ty, $output:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::config`].
            #[inline]
            #[must_use]
            pub fn config(&self) -> &$config {
                <Self as Indicator>::config(self)
            }

            /// See [`Indicator::apply`].
            ///
            /// # Errors
            ///
            /// See [`Indicator::apply`].
            #[inline]
            pub fn apply(&self, input: $input) -> Result<$output> {
                <Self as Indicator>::apply(self, input)
            }
        }
    };
}

impl_indicator_methods!(Ema, EmaConfig, &[Price], Vec<Price>);
impl_indicator_methods!(Wilders, WildersConfig, &[Price], Vec<Price>);
impl_indicator_methods!(Kama, KamaConfig, &[Price], Vec<Price>);
impl_indicator_methods!(Sma, SmaConfig, &[Price], Vec<Price>);
impl_indicator_methods!(Atr, AtrConfig, Hlc<'_>, Vec<Price>);
impl_indicator_methods!(Psar, PsarConfig, Hlc<'_>, Vec<Price>);
impl_indicator_methods!(Supertrend, SupertrendConfig, Hlc<'_>, Vec<Price>);
impl_indicator_methods!(Macd, MacdConfig, &[Price], MacdSeries);
impl_indicator_methods!(Trix, TrixConfig, &[Price], Vec<Price>);
impl_indicator_methods!(Tsi, TsiConfig, &[Price], TsiSeries);
impl_indicator_methods!(Rsi, RsiConfig, &[Price], Vec<Price>);
impl_indicator_methods!(Keltner, KeltnerConfig, Hlc<'_>, KeltnerSeries);
impl_indicator_methods!(Bb, BbConfig, &[Price], BbSeries);
impl_indicator_methods!(Adx, AdxConfig, Hlc<'_>, AdxSeries);

#[cfg(test)]
mod test_util;
