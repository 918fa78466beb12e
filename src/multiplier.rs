use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use crate::{Error, Result};

/// Positive, finite `f64` parameter: acceleration-factor step and cap,
/// band multipliers.
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// NaN is rejected at construction.
///
/// ```
/// use recursive_ta::Multiplier;
///
/// assert_eq!(Multiplier::new(2.0).unwrap().value(), 2.0);
/// assert!(Multiplier::new(0.0).is_err());
/// assert!(Multiplier::new(f64::NAN).is_err());
/// ```
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
pub struct Multiplier(f64);

impl Multiplier {
    /// Wraps `value`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] if `value` is NaN, infinite, zero or
    /// negative.
    pub fn new(value: f64) -> Result<Self> {
        Self::named("multiplier", value)
    }

    pub(crate) fn named(name: &'static str, value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::invalid(name, format!("must be finite, got {value}")));
        }
        if value <= 0.0 {
            return Err(Error::invalid(name, format!("must be positive, got {value}")));
        }

        Ok(Self(value))
    }

    /// Compile-time constant for known-good defaults.
    pub(crate) const fn constant(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Multiplier {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Multiplier {}

impl Hash for Multiplier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for Multiplier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Multiplier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Display for Multiplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<f64> for Multiplier {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Multiplier> for f64 {
    fn from(value: Multiplier) -> Self {
        value.0
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rejects_zero() {
        assert!(matches!(
            Multiplier::new(0.0),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn rejects_negative() {
        assert!(Multiplier::new(-0.5).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(Multiplier::new(f64::NAN).is_err());
        assert!(Multiplier::new(f64::INFINITY).is_err());
    }

    #[test]
    fn named_reports_parameter() {
        let err = Multiplier::named("factor", -1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid parameter `factor`: must be positive, got -1"
        );
    }

    #[test]
    fn eq_and_hash_by_value() {
        let mut set = HashSet::new();
        set.insert(Multiplier::new(0.02).unwrap());
        assert!(set.contains(&Multiplier::new(0.02).unwrap()));
        assert!(!set.contains(&Multiplier::new(0.2).unwrap()));
    }

    #[test]
    fn ordered_by_value() {
        assert!(Multiplier::new(0.02).unwrap() < Multiplier::new(0.2).unwrap());
    }

    #[test]
    fn displays_plain_number() {
        assert_eq!(Multiplier::new(2.5).unwrap().to_string(), "2.5");
    }

    #[test]
    fn converts_from_f64() {
        let m: Multiplier = 3.0.try_into().unwrap();
        assert_eq!(f64::from(m), 3.0);
    }
}
