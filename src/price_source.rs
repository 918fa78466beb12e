use crate::{Ohlcv, Price};

use std::fmt::{Debug, Display};

/// Value derived from each [`Ohlcv`] bar to build an input series.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PriceSource {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Closing price.
    #[default]
    Close,
    /// Lowest price.
    Low,
    /// Median price: `(high + low) / 2`.
    HL2,
    /// Typical price: `(high + low + close) / 3`.
    HLC3,
    /// Average price: `(open + high + low + close) / 4`.
    OHLC4,
    /// Weighted close: `(high + low + close + close) / 4`.
    HLCC4,
    /// True range: `max(high - low, |high - prev_close|, |low - prev_close|)`.
    ///
    /// The first bar has no previous close and yields `high - low`.
    TrueRange,
}

impl Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl PriceSource {
    /// Extracts this source from every bar, producing a series aligned 1:1
    /// with `bars`.
    ///
    /// ```
    /// use recursive_ta::{Bar, PriceSource};
    ///
    /// let bars = [Bar::new(1.0, 4.0, 2.0, 3.0), Bar::new(3.0, 6.0, 4.0, 5.0)];
    /// assert_eq!(PriceSource::HL2.series(&bars), vec![3.0, 5.0]);
    /// ```
    #[must_use]
    pub fn series<B: Ohlcv>(self, bars: &[B]) -> Vec<Price> {
        let mut prev_close = None;

        bars.iter()
            .map(|bar| {
                let price = self.extract(bar, prev_close);
                prev_close = Some(bar.close());
                price
            })
            .collect()
    }

    #[inline]
    pub(crate) fn extract(self, ohlcv: &impl Ohlcv, prev_close: Option<Price>) -> Price {
        match self {
            Self::Open => ohlcv.open(),
            Self::High => ohlcv.high(),
            Self::Close => ohlcv.close(),
            Self::Low => ohlcv.low(),
            Self::HL2 => f64::midpoint(ohlcv.high(), ohlcv.low()),
            Self::HLC3 => (ohlcv.high() + ohlcv.low() + ohlcv.close()) / 3.0,
            Self::OHLC4 => (ohlcv.open() + ohlcv.high() + ohlcv.low() + ohlcv.close()) / 4.0,
            Self::HLCC4 => (ohlcv.high() + ohlcv.low() + ohlcv.close() + ohlcv.close()) / 4.0,
            Self::TrueRange => true_range(ohlcv.high(), ohlcv.low(), prev_close),
        }
    }
}

/// Single-bar true range, falling back to `high - low` without a prior close.
#[inline]
pub(crate) fn true_range(high: Price, low: Price, prev_close: Option<Price>) -> Price {
    let hl = high - low;

    match prev_close {
        Some(prev_close) => {
            let hc = (high - prev_close).abs();
            let lc = (low - prev_close).abs();
            hl.max(hc).max(lc)
        }
        None => hl,
    }
}
