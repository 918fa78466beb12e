use crate::{Ohlcv, Price, PriceSource, Result, error};

/// Borrowed, index-aligned high/low/close columns.
///
/// Construction guarantees equal lengths, so the state machines can index
/// all three columns with the same bar position.
///
/// ```
/// use recursive_ta::{Error, Hlc};
///
/// let hlc = Hlc::new(&[2.0, 3.0], &[1.0, 2.0], &[1.5, 2.5]).unwrap();
/// assert_eq!(hlc.len(), 2);
/// assert_eq!(hlc.midpoint(1), 2.5);
///
/// let err = Hlc::new(&[2.0, 3.0], &[1.0], &[1.5, 2.5]).unwrap_err();
/// assert!(matches!(err, Error::ShapeMismatch { name: "low", .. }));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Hlc<'a> {
    high: &'a [Price],
    low: &'a [Price],
    close: &'a [Price],
}

impl<'a> Hlc<'a> {
    /// Wraps three columns.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) if `low` or
    /// `close` differ in length from `high`.
    pub fn new(high: &'a [Price], low: &'a [Price], close: &'a [Price]) -> Result<Self> {
        error::aligned("low", high.len(), low.len())?;
        error::aligned("close", high.len(), close.len())?;

        Ok(Self { high, low, close })
    }

    /// Number of bars.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.close.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn high(&self) -> &'a [Price] {
        self.high
    }

    #[inline]
    #[must_use]
    pub fn low(&self) -> &'a [Price] {
        self.low
    }

    #[inline]
    #[must_use]
    pub fn close(&self) -> &'a [Price] {
        self.close
    }

    /// `(high + low) / 2` at bar `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn midpoint(&self, index: usize) -> Price {
        f64::midpoint(self.high[index], self.low[index])
    }
}

/// Owned OHLCV columns, the column-major form of a bar slice.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OhlcvSeries {
    open: Vec<Price>,
    high: Vec<Price>,
    low: Vec<Price>,
    close: Vec<Price>,
    volume: Option<Vec<f64>>,
}

impl OhlcvSeries {
    /// Splits bars into columns. Volume is kept only if every bar has one.
    #[must_use]
    pub fn from_bars<B: Ohlcv>(bars: &[B]) -> Self {
        Self {
            open: PriceSource::Open.series(bars),
            high: PriceSource::High.series(bars),
            low: PriceSource::Low.series(bars),
            close: PriceSource::Close.series(bars),
            volume: bars.iter().map(Ohlcv::volume).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.close.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    #[must_use]
    pub fn open(&self) -> &[Price] {
        &self.open
    }

    #[must_use]
    pub fn high(&self) -> &[Price] {
        &self.high
    }

    #[must_use]
    pub fn low(&self) -> &[Price] {
        &self.low
    }

    #[must_use]
    pub fn close(&self) -> &[Price] {
        &self.close
    }

    #[must_use]
    pub fn volume(&self) -> Option<&[f64]> {
        self.volume.as_deref()
    }

    /// High/low/close view for the state machines.
    #[must_use]
    pub fn hlc(&self) -> Hlc<'_> {
        Hlc {
            high: &self.high,
            low: &self.low,
            close: &self.close,
        }
    }

    /// Derives a column from the stored bars.
    #[must_use]
    pub fn column(&self, source: PriceSource) -> Vec<Price> {
        match source {
            PriceSource::Open => self.open.clone(),
            PriceSource::High => self.high.clone(),
            PriceSource::Low => self.low.clone(),
            PriceSource::Close => self.close.clone(),
            _ => source.series(&self.bars()),
        }
    }

    fn bars(&self) -> Vec<crate::Bar> {
        (0..self.len())
            .map(|i| crate::Bar::new(self.open[i], self.high[i], self.low[i], self.close[i]))
            .collect()
    }
}
