use std::{fmt::Display, num::NonZero, str::FromStr};

use crate::{EmaSeed, Error, Price, Result, ema, error, kama, sma, wma};

/// Smoothing method selector shared by every indicator that averages.
///
/// A closed set of algorithms behind one call contract,
/// [`apply(series, window)`](MovingAverage::apply), so higher-level indicators
/// (MACD, TRIX, TSI, RSI, ATR, Keltner) can chain smoothers without knowing
/// which one is active. Parse one from its identifier with [`FromStr`].
///
/// ```
/// use recursive_ta::MovingAverage;
///
/// let method: MovingAverage = "wilders".parse().unwrap();
/// let out = method.apply(&[8.0, 12.0], 4).unwrap();
/// assert_eq!(out, vec![8.0, 9.0]);
///
/// assert!("zlema".parse::<MovingAverage>().is_err());
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MovingAverage {
    /// Simple rolling mean.
    #[default]
    Sma,
    /// Linearly weighted rolling mean.
    Wma,
    /// Hull moving average.
    Hma,
    /// Exponential, `α = 2 / (n + 1)`.
    Ema(EmaSeed),
    /// Wilder's, `α = 1 / n`.
    Wilders(EmaSeed),
    /// Kaufman adaptive, with the fast/slow smoothing periods.
    Kama {
        fast: NonZero<usize>,
        slow: NonZero<usize>,
    },
}

impl MovingAverage {
    /// EMA seeded with the first value.
    pub const EMA: Self = Self::Ema(EmaSeed::First);

    /// Wilder's average seeded with the first value.
    pub const WILDERS: Self = Self::Wilders(EmaSeed::First);

    /// KAMA with fast 2 / slow 30.
    pub const KAMA: Self = Self::Kama {
        fast: NonZero::new(2).unwrap(),
        slow: NonZero::new(30).unwrap(),
    };

    /// Smooths `series` over `window` bars.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if `window` is zero, or for
    /// [`Kama`](Self::Kama) if `fast` is not below `slow`.
    pub fn apply(&self, series: &[Price], window: usize) -> Result<Vec<Price>> {
        self.smooth(series, error::window("window", window)?)
    }

    pub(crate) fn smooth(&self, series: &[Price], length: NonZero<usize>) -> Result<Vec<Price>> {
        let n = length.get();

        #[allow(clippy::cast_precision_loss)]
        let out = match *self {
            Self::Sma => sma::simple(series, n),
            Self::Wma => wma::weighted(series, n),
            Self::Hma => wma::hull(series, n),
            Self::Ema(seed) => ema::exponential(series, 2.0 / (n as f64 + 1.0), n, seed),
            Self::Wilders(seed) => ema::exponential(series, 1.0 / n as f64, n, seed),
            Self::Kama { fast, slow } => {
                kama::check_periods(fast, slow)?;
                kama::adaptive(series, length, fast, slow)
            }
        };

        Ok(out)
    }

    /// Identifier accepted by [`FromStr`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sma => "sma",
            Self::Wma => "wma",
            Self::Hma => "hma",
            Self::Ema(_) => "ema",
            Self::Wilders(_) => "wilders",
            Self::Kama { .. } => "kama",
        }
    }
}

impl Display for MovingAverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MovingAverage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sma" => Ok(Self::Sma),
            "wma" => Ok(Self::Wma),
            "hma" => Ok(Self::Hma),
            "ema" => Ok(Self::EMA),
            "wilders" => Ok(Self::WILDERS),
            "kama" => Ok(Self::KAMA),
            _ => Err(Error::UnknownMethod(s.to_owned())),
        }
    }
}
