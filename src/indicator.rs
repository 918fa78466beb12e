use crate::Result;

use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// Configuration for a technical [`Indicator`].
///
/// Every indicator has a corresponding config type that holds its parameters
/// (window length, multipliers, smoothing method). Configs are value types:
/// cheap to copy, compare, and hash. They are validated once, when the
/// builder runs, so a config value is always usable.
pub trait IndicatorConfig: Sized + Copy + PartialEq + Eq + Hash + Display + Debug {
    /// Builder type for constructing this config.
    type Builder: IndicatorConfigBuilder<Self>;

    /// Returns a new builder with default values.
    fn builder() -> Self::Builder;
}

/// Builder for an [`IndicatorConfig`].
pub trait IndicatorConfigBuilder<Config>
where
    Config: IndicatorConfig,
{
    /// Validates the collected parameters and builds the config.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`](crate::Error::InvalidParameter) if a
    /// required field is missing or a constraint between fields is violated.
    fn build(self) -> Result<Config>;
}

/// A technical indicator computed in one forward pass.
///
/// [`apply`](Indicator::apply) consumes an index-aligned input and returns
/// output of the same length, with a `NaN` warm-up prefix where history is
/// insufficient. The pass owns all of its state; calling `apply` on the same
/// indicator from several threads with different inputs is safe.
///
/// # Example
///
/// ```
/// use recursive_ta::{Ema, EmaConfig, Indicator, IndicatorConfig, IndicatorConfigBuilder};
/// use std::num::NonZero;
///
/// let config = EmaConfig::builder()
///     .length(NonZero::new(3).unwrap())
///     .build()
///     .unwrap();
/// let ema = Ema::new(config);
///
/// assert_eq!(ema.apply(&[2.0, 4.0, 8.0]).unwrap(), vec![2.0, 3.0, 5.5]);
/// ```
pub trait Indicator: Sized + Clone + Display + Debug {
    /// Configuration type for this indicator.
    type Config: IndicatorConfig;

    /// Borrowed input: a price series or a high/low/close view.
    type Input<'a>;

    /// Computed output. `Vec<Price>` for single-line indicators,
    /// a struct of aligned series for composite ones.
    type Output: Debug;

    /// Creates a new indicator from the given config.
    fn new(config: Self::Config) -> Self;

    /// The config this indicator was built from.
    fn config(&self) -> &Self::Config;

    /// Runs the indicator over `input`.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) when parallel
    /// inputs are not aligned. Numeric degeneracies never fail; they yield
    /// `NaN`.
    fn apply(&self, input: Self::Input<'_>) -> Result<Self::Output>;
}
